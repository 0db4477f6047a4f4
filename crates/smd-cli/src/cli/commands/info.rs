//! `smd info` – preview a URL's metadata.

use anyhow::Result;
use smd_core::Dispatcher;

pub async fn run_info(dispatcher: &Dispatcher, url: &str) -> Result<()> {
    let (platform, meta) = dispatcher.info(url).await?;
    println!("platform:    {}", platform.display_name());
    println!("title:       {}", meta.title);
    println!("author:      {}", meta.author);
    if let Some(secs) = meta.duration {
        println!("duration:    {}:{:02}", secs / 60, secs % 60);
    }
    if let Some(views) = meta.view_count {
        println!("views:       {views}");
    }
    if let Some(likes) = meta.like_count {
        println!("likes:       {likes}");
    }
    if let Some(thumbnail) = &meta.thumbnail {
        println!("thumbnail:   {thumbnail}");
    }
    let formats: Vec<&str> = meta.formats.iter().map(|f| f.as_str()).collect();
    println!("formats:     {}", formats.join(", "));
    if !meta.description.is_empty() {
        println!();
        println!("{}", meta.description);
    }
    Ok(())
}
