use vidresolve::resolve::source_url;

pub fn cmd_classify(url: &str) -> bool {
    match source_url::normalize(url) {
        Ok(normalized) => {
            println!("{}", vidresolve::classify(&normalized.url));
            true
        }
        Err(e) => {
            eprintln!("❌ {e}");
            false
        }
    }
}
