//! Session banner, build info and usage text

use crossterm::style::Color;

use super::style::Palette;

/// Version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build stamp, injected by release tooling
pub const BUILD: &str = match option_env!("CROSS_BUILD") {
    Some(build) => build,
    None => "dev",
};

/// Default terminal title
pub const TITLE: &str = "Cross Interactive Command-Line Compiler Shell";

const LOGO: [&str; 3] = [
    "       █████  █████",
    "       ██        ██",
    "       █████  █████",
];

/// Host platform, e.g. `Linux(64-bit)`
pub fn platform() -> String {
    let os = match std::env::consts::OS {
        "windows" => "Windows",
        "macos" => "MacOS",
        "linux" => "Linux",
        other => other,
    };
    format!("{}({}-bit)", os, usize::BITS)
}

/// Banner printed when the session attaches
pub fn header(palette: &Palette) -> String {
    let mut out = String::new();
    for line in LOGO {
        out.push_str(&palette.bold(line, Color::Green));
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&palette.bold(TITLE, Color::White));
    out.push('\n');
    out.push_str(&build_info(palette));
    out.push('\n');
    out.push_str(&palette.paint(
        format!("© {}", env!("CARGO_PKG_AUTHORS")),
        Color::DarkGrey,
    ));
    out.push('\n');
    out
}

/// `Version X Build Y on Platform`
pub fn build_info(palette: &Palette) -> String {
    format!(
        "{}{}{}{}{}{}",
        palette.paint("Version ", Color::Grey),
        palette.bold(VERSION, Color::Grey),
        palette.paint(" Build ", Color::Grey),
        palette.bold(BUILD, Color::Grey),
        palette.paint(" on ", Color::Grey),
        palette.bold(platform(), Color::Grey),
    )
}

/// One-line usage summary
pub fn usage(palette: &Palette) -> String {
    format!(
        "{}{} {}{}",
        palette.bold("Usage", Color::Cyan),
        palette.paint(":", Color::Cyan),
        palette.bold("$ cross", Color::Grey),
        palette.paint(" [<modules..>] [<-flags..>]", Color::Grey),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_has_bits() {
        let platform = platform();
        assert!(platform.ends_with(&format!("({}-bit)", usize::BITS)));
    }

    #[test]
    fn test_plain_header() {
        let header = header(&Palette::PLAIN);
        assert!(header.contains(TITLE));
        assert!(header.contains(&format!("Version {} Build {}", VERSION, BUILD)));
        assert!(!header.contains('\x1b'));
    }

    #[test]
    fn test_plain_usage() {
        assert_eq!(
            usage(&Palette::PLAIN),
            "Usage: $ cross [<modules..>] [<-flags..>]"
        );
    }
}
