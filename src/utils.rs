use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

use crate::aggregate::TOP_DOMAIN_LIMIT;
use crate::export::ExportKind;

pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let timer = LocalTime::new(format_description!(
        "[hour]:[minute]:[second].[subsecond digits:3]"
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(timer)
        .with_writer(std::io::stderr)
        .init();
}

pub fn format_number(num: u64) -> String {
    let digits = num.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn redact_domain(domain: &str) -> String {
    let parts: Vec<&str> = domain.split('.').collect();
    if parts.len() <= 1 {
        return domain.to_string();
    }

    if parts[parts.len() - 2].len() <= 3 {
        return format!("???.{}", parts[parts.len() - 1]);
    }

    let redacted_parts: Vec<String> = parts[..parts.len() - 1]
        .iter()
        .map(|part| "*".repeat(part.len()))
        .collect();

    let mut result = redacted_parts.join(".");
    result.push('.');
    result.push_str(parts[parts.len() - 1]);
    result
}

pub fn validate_args(args: &crate::args::Args) -> anyhow::Result<()> {
    if args.days == 0 {
        anyhow::bail!("--days must be greater than 0");
    }

    if let Some(top) = args.top {
        if top == 0 {
            anyhow::bail!("--top must be greater than 0");
        }
        if top > TOP_DOMAIN_LIMIT {
            anyhow::bail!("--top cannot exceed {}", TOP_DOMAIN_LIMIT);
        }
    }

    if args.export == Some(ExportKind::DomainDetail) && args.domain.is_none() {
        anyhow::bail!("--export domain-detail requires --domain");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Args;
    use clap::Parser;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_redact_domain() {
        assert_eq!(redact_domain("localhost"), "localhost");
        assert_eq!(redact_domain("bbc.co.uk"), "???.uk");
        assert_eq!(redact_domain("github.com"), "******.com");
        assert_eq!(redact_domain("news.ycombinator.com"), "****.***********.com");
    }

    #[test]
    fn test_validate_args() {
        let ok = Args::parse_from(["historee-export", "--top", "5"]);
        assert!(validate_args(&ok).is_ok());

        let zero_days = Args::parse_from(["historee-export", "--days", "0"]);
        assert!(validate_args(&zero_days).is_err());

        let too_many = Args::parse_from(["historee-export", "--top", "11"]);
        assert!(validate_args(&too_many).is_err());

        let no_domain = Args::parse_from(["historee-export", "--export", "domain-detail"]);
        assert!(validate_args(&no_domain).is_err());

        let with_domain = Args::parse_from([
            "historee-export",
            "--export",
            "domain-detail",
            "--domain",
            "github.com",
        ]);
        assert!(validate_args(&with_domain).is_ok());
    }
}
