//! `smd platforms` – list platforms and the content types each accepts.

use anyhow::Result;
use smd_core::Platform;

pub fn run_platforms() -> Result<()> {
    println!("{:<10} {:<22} {}", "PLATFORM", "TYPES", "HOSTS");
    for platform in Platform::ALL {
        let types: Vec<&str> = platform.content_types().iter().map(|c| c.as_str()).collect();
        println!(
            "{:<10} {:<22} {}",
            platform.as_str(),
            types.join(","),
            platform.domains().join(",")
        );
    }
    Ok(())
}
