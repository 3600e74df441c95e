//! The `quizrun init` command.

use std::path::Path;

use anyhow::{Context, Result};

use quizrun_banks::config::{CONFIG_FILE, STARTER_CONFIG};

pub fn execute() -> Result<()> {
    write_if_missing(Path::new(CONFIG_FILE), STARTER_CONFIG)?;

    std::fs::create_dir_all("banks").context("failed to create banks directory")?;
    write_if_missing(Path::new("banks/banks.json"), SAMPLE_MANIFEST)?;
    write_if_missing(Path::new("banks/sample.json"), SAMPLE_BANK)?;

    println!("\nNext steps:");
    println!("  1. Add your own banks under banks/ and list them in banks/banks.json");
    println!("  2. Run: quizrun validate");
    println!("  3. Run: quizrun run --banks sample --count 5 --timer 5");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_MANIFEST: &str = r#"{
  "banks": [
    { "id": "sample", "title": "Sample: Networking basics", "file": "sample.json", "count": 6 }
  ]
}
"#;

const SAMPLE_BANK: &str = r#"{
  "meta": { "title": "Networking basics", "version": 1 },
  "questions": [
    {
      "id": 1,
      "question": "Which layer of the OSI model is responsible for routing between networks?",
      "options": ["Data link", "Network", "Transport", "Session"],
      "answer_index": 1,
      "explain": "Routers operate at layer 3, the network layer.",
      "difficulty": "easy",
      "topic": "OSI model"
    },
    {
      "id": 2,
      "question": "What is the default port for HTTPS?",
      "options": ["80", "8080", "443", "22"],
      "answer_index": 2,
      "difficulty": "easy",
      "tags": ["ports", "tls"]
    },
    {
      "id": 3,
      "question": "Which protocol resolves an IPv4 address to a MAC address?",
      "options": ["DNS", "DHCP", "ARP", "ICMP"],
      "answer_index": 2,
      "explain": "ARP maps layer 3 addresses to layer 2 addresses on the local segment.",
      "difficulty": "medium",
      "topic": "Addressing"
    },
    {
      "id": 4,
      "question": "How many usable host addresses does a /28 subnet provide?",
      "options": ["14", "16", "30", "62"],
      "answer_index": 0,
      "explain": "2^4 addresses minus the network and broadcast addresses.",
      "difficulty": "hard_standard",
      "tags": ["subnetting"]
    },
    {
      "id": 5,
      "question": "Which TCP flag combination opens a connection?",
      "options": ["FIN", "SYN", "RST", "PSH"],
      "answer_index": 1,
      "difficulty": "medium",
      "topic": "TCP"
    },
    {
      "id": 6,
      "question": "Which mechanism lets a BGP speaker prefer one of several equal-length AS paths?",
      "options": ["Local preference", "Split horizon", "Hold-down timer", "Poison reverse"],
      "answer_index": 0,
      "explain": "Local preference is evaluated before AS path length in best-path selection.",
      "difficulty": "hard_advanced",
      "tags": ["bgp", "routing"]
    }
  ]
}
"#;
