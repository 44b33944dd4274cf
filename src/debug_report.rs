use kwres::{MatchPhase, ParsedQuery, Resolution, ResolveVerbose};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const RED: &str = "\x1b[31m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_resolve(query: &str, source: &str, out: &ResolveVerbose, color: bool) {
    let palette = ansi::Palette::new(color);
    print_header(query, source, &palette);

    println!("\n{}", palette.paint("━━━ Matching ━━━", ansi::GRAY));
    println!("  {} {}", palette.dim("normalized:"), palette.paint(&out.details.normalized_query, ansi::CYAN));
    let tiers: Vec<&str> = out.details.tiers.iter().map(|t| t.as_str()).collect();
    println!("  {} {}", palette.dim("tiers:"), palette.paint(tiers.join(" → "), ansi::BLUE));
    let phase = match out.details.phase {
        Some(MatchPhase::DirectLookup) => palette.paint("direct lookup", ansi::GREEN),
        Some(MatchPhase::ContainmentScan) => palette.paint("containment scan", ansi::YELLOW),
        None => palette.dim("no phase matched"),
    };
    println!("  {} {}  {} {}", palette.dim("phase:"), phase, palette.dim("│ probes:"), out.details.probes);

    println!("\n{}", palette.paint("━━━ Result ━━━", ansi::GRAY));
    match &out.resolution {
        Some(resolution) => print_resolution(resolution, &palette),
        None => {
            println!("{}", palette.dim("  No canonical keyword matched"));
            println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
            println!("  • The phrase is not registered as a term, synonym or typo");
            println!("  • The phrase appears only inside a longer word");
            println!("  • Its tier was excluded with --tiers");
        }
    }

    print_timing(out, &palette);
}

pub fn print_validate(query: &str, source: &str, resolution: Option<&Resolution>, color: bool) {
    let palette = ansi::Palette::new(color);
    print_header(query, source, &palette);

    println!("\n{}", palette.paint("━━━ Validation ━━━", ansi::GRAY));
    match resolution {
        Some(resolution) => {
            println!("  {}", palette.bold(palette.paint("✓ approved", ansi::GREEN)));
            print_resolution(resolution, &palette);
        }
        None => println!("  {}", palette.paint("✗ not approved (lenient: no error)", ansi::YELLOW)),
    }
    println!();
}

pub fn print_parsed(query: &str, source: &str, parsed: Option<&ParsedQuery>, color: bool) {
    let palette = ansi::Palette::new(color);
    print_header(query, source, &palette);

    println!("\n{}", palette.paint("━━━ Parsed Query ━━━", ansi::GRAY));
    let Some(parsed) = parsed else {
        println!("{}", palette.dim("  Not a recognized keyword query"));
        println!();
        return;
    };

    println!(
        "  {} {} {} {}",
        palette.bold(palette.paint(&parsed.canonical_id, ansi::GREEN)),
        palette.dim("│"),
        palette.paint(format!("\"{}\"", parsed.matched_term), ansi::CYAN),
        palette.paint(parsed.tier.as_str(), ansi::BLUE),
    );
    print_tokens("must_not", &parsed.must_not, ansi::RED, &palette);
    print_tokens("ignored", &parsed.ignored, ansi::YELLOW, &palette);
    print_tokens("negative", &parsed.negative_terms, ansi::GRAY, &palette);
    for (label, map) in [("filters", &parsed.filters), ("boosts", &parsed.boosts), ("rerank", &parsed.rerank)] {
        if !map.is_empty() {
            let rendered = serde_json::to_string(map).unwrap_or_default();
            println!("  {:<9} {}", palette.dim(label), palette.dim(rendered));
        }
    }
    println!();
}

fn print_header(query: &str, source: &str, palette: &ansi::Palette) {
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Resolving: \"{}\"", query), ansi::CYAN)));
    println!("  {} {}", palette.dim("registry:"), palette.dim(source));
}

fn print_resolution(resolution: &Resolution, palette: &ansi::Palette) {
    println!(
        "  {} {} {} {}",
        palette.bold(palette.paint(&resolution.canonical_id, ansi::GREEN)),
        palette.dim("│"),
        palette.paint(format!("\"{}\"", resolution.matched_term), ansi::CYAN),
        palette.paint(resolution.tier.as_str(), ansi::BLUE),
    );
}

fn print_tokens(label: &str, tokens: &[String], color: &str, palette: &ansi::Palette) {
    let rendered = if tokens.is_empty() { palette.dim("—") } else { palette.paint(tokens.join(", "), color) };
    println!("  {:<9} {}", palette.dim(label), rendered);
}

fn print_timing(out: &ResolveVerbose, palette: &ansi::Palette) {
    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    let loaded = out.loaded_at.map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string()).unwrap_or_else(|| "-".into());
    println!(
        "  Match: {}  │  Registry loaded: {}",
        palette.paint(format!("{:?}", out.details.elapsed), ansi::GREEN),
        palette.dim(loaded),
    );
    println!();
}
