use console::style;
use tikgrab_core::DownloadResult;

/// Direct media URLs of a result, labelled, in display order.
pub fn media_entries(result: &DownloadResult) -> Vec<(&'static str, &str)> {
    match result {
        DownloadResult::TikTok(video) => {
            let Some(details) = &video.result else {
                return Vec::new();
            };
            [
                ("SD", details.video_sd.as_deref()),
                ("HD", details.video_hd.as_deref()),
                ("Watermark", details.video_watermark.as_deref()),
                ("Audio", details.music.as_deref()),
                (
                    "Avatar",
                    details.author.as_ref().and_then(|author| author.avatar.as_deref()),
                ),
            ]
            .into_iter()
            .filter_map(|(label, url)| url.map(|url| (label, url)))
            .collect()
        }
        DownloadResult::Douyin(video) => vec![("Video", video.download_url.as_str())],
    }
}

pub fn print_result(source_url: &str, result: &DownloadResult, simple: bool) {
    let entries = media_entries(result);
    if simple {
        if let Some((_, url)) = entries.first() {
            println!("{url}");
        }
        return;
    }

    println!("{} {}", style("From:").cyan(), source_url);
    if let DownloadResult::TikTok(video) = result
        && let Some(details) = &video.result
    {
        if let Some(nickname) = details.author.as_ref().and_then(|a| a.nickname.as_deref()) {
            println!("  {} {nickname}", style("Author:").dim());
        }
        if let Some(desc) = &details.desc {
            println!("  {} {desc}", style("Caption:").dim());
        }
    }

    if entries.is_empty() {
        println!("{} (no media urls)", style("To:").red());
    }
    for (label, url) in entries {
        println!("{} {url}", style(format!("{label}:")).green());
    }
    println!();
}

pub fn print_summary(total: usize, success: usize, failed: usize) {
    println!(
        "{} Total: {} | Success: {} | Failed: {}",
        style("Summary:").bold(),
        total,
        success,
        failed
    );
}
