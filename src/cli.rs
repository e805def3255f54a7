//! Command-line argument parsing for TeeClaim

/// Parse command line arguments
#[derive(Debug, PartialEq)]
pub struct Args {
    /// JSON file with one booking request per member.
    pub requests: Option<String>,
    /// Start polling immediately instead of waiting for the release instant.
    pub skip_wait: bool,
    /// Plan the attempt (dates, candidates) and exit without opening a browser.
    pub dry_run: bool,
    pub validate: bool,
    pub help: bool,
}

pub fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    parse_from(&args)
}

fn parse_from(args: &[String]) -> Args {
    let mut result = Args {
        requests: None,
        skip_wait: false,
        dry_run: false,
        validate: false,
        help: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--requests" => {
                if i + 1 < args.len() {
                    i += 1;
                    result.requests = Some(args[i].clone());
                }
            }
            "--skip-wait" => result.skip_wait = true,
            "--dry-run" => result.dry_run = true,
            "--validate" => result.validate = true,
            "--help" | "-h" => result.help = true,
            _ => {}
        }
        i += 1;
    }

    result
}

pub fn print_help() {
    println!("TeeClaim - Tee-Time Booking Bot\n");
    println!("USAGE:");
    println!("    teeclaim [OPTIONS]\n");
    println!("OPTIONS:");
    println!("    --requests FILE     JSON file of booking requests (default: single");
    println!("                        request from TEE_USERNAME/TEE_PASSWORD/TEE_*_TIME)");
    println!("    --skip-wait         Do not wait for the release instant, poll now");
    println!("    --dry-run           Print the planned day and candidate times, then exit");
    println!("    --validate          Validate configuration and exit");
    println!("    --help, -h          Show this help message\n");
    println!("ENVIRONMENT:");
    println!("    See .env.example for configuration variables");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parts: &[&str]) -> Vec<String> {
        std::iter::once("teeclaim")
            .chain(parts.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_args_default() {
        let result = parse_from(&args(&[]));
        assert!(result.requests.is_none());
        assert!(!result.skip_wait);
        assert!(!result.dry_run);
        assert!(!result.validate);
        assert!(!result.help);
    }

    #[test]
    fn test_parse_args_requests_file() {
        let result = parse_from(&args(&["--requests", "members.json"]));
        assert_eq!(result.requests, Some("members.json".to_string()));
    }

    #[test]
    fn test_parse_args_requests_without_value_is_ignored() {
        let result = parse_from(&args(&["--requests"]));
        assert!(result.requests.is_none());
    }

    #[test]
    fn test_parse_args_skip_wait() {
        let result = parse_from(&args(&["--skip-wait"]));
        assert!(result.skip_wait);
    }

    #[test]
    fn test_parse_args_validate() {
        let result = parse_from(&args(&["--validate"]));
        assert!(result.validate);
    }

    #[test]
    fn test_parse_args_help() {
        assert!(parse_from(&args(&["--help"])).help);
        assert!(parse_from(&args(&["-h"])).help);
    }

    #[test]
    fn test_parse_args_multiple_flags() {
        let result = parse_from(&args(&["--skip-wait", "--requests", "m.json", "--dry-run"]));
        assert!(result.skip_wait);
        assert!(result.dry_run);
        assert_eq!(result.requests, Some("m.json".to_string()));
    }

    #[test]
    fn test_parse_args_unknown_flags_ignored() {
        let result = parse_from(&args(&["--frobnicate"]));
        assert_eq!(
            result,
            Args {
                requests: None,
                skip_wait: false,
                dry_run: false,
                validate: false,
                help: false,
            }
        );
    }
}
