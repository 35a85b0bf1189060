use clap::Parser;

use crate::config::DEFAULT_CONFIG_FILE;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "mini-ftpd", about = "A minimal active-mode FTP server.")]
pub struct Cli {
    /// TCP port for the control connection (must be greater than 1024)
    #[arg(value_parser = clap::value_parser!(u16).range(1025..))]
    pub port: u16,

    /// Configuration file name, without the .toml extension
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_is_required() {
        assert!(Cli::try_parse_from(["mini-ftpd"]).is_err());
    }

    #[test]
    fn test_port_must_exceed_1024() {
        assert!(Cli::try_parse_from(["mini-ftpd", "1024"]).is_err());
        assert!(Cli::try_parse_from(["mini-ftpd", "not-a-port"]).is_err());
        assert!(Cli::try_parse_from(["mini-ftpd", "70000"]).is_err());

        let cli = Cli::try_parse_from(["mini-ftpd", "1025"]).unwrap();
        assert_eq!(cli.port, 1025);
        assert_eq!(cli.config, "config");
    }

    #[test]
    fn test_config_flag() {
        let cli = Cli::try_parse_from(["mini-ftpd", "2121", "--config", "/etc/mini-ftpd"]).unwrap();
        assert_eq!(cli.config, "/etc/mini-ftpd");
    }
}
