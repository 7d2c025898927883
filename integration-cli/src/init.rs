use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

pub const DEFAULT_ENV_FILE: &str = ".env.integration";
pub const PLACEHOLDER_SECRET: &str = "your-secret-key";
pub const PLACEHOLDER_ORIGIN: &str = "server-name";

pub fn template() -> String {
    format!(
        "# Secret key used to sign and verify integration tokens\n\
         INTEGRATION_API_SECRET={PLACEHOLDER_SECRET}\n\
         \n\
         # Signing algorithm (HS256, HS384 or HS512)\n\
         INTEGRATION_API_ALG=HS256\n\
         \n\
         # Name of this server, embedded in every token it signs\n\
         INTEGRATION_API_ORIGIN={PLACEHOLDER_ORIGIN}\n\
         \n\
         # Origins allowed to call this server, comma separated\n\
         INTEGRATION_API_ALLOWED_ORIGINS=\n\
         \n\
         # Token lifetime in seconds (default 4 hours)\n\
         INTEGRATION_API_TOKEN_TTL_SECONDS=14400\n\
         \n\
         # Clock skew tolerated when checking expiry, in seconds (at most one day)\n\
         INTEGRATION_API_LEEWAY_SECONDS=0\n"
    )
}

/// Write the configuration template to `path`. Existing files are kept
/// unless `force` is set.
pub fn write_template(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        );
    }

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    fs::write(path, template()).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_lists_every_setting() {
        let text = template();
        for key in [
            "INTEGRATION_API_SECRET=your-secret-key",
            "INTEGRATION_API_ALG=HS256",
            "INTEGRATION_API_ORIGIN=server-name",
            "INTEGRATION_API_ALLOWED_ORIGINS=",
            "INTEGRATION_API_TOKEN_TTL_SECONDS=14400",
            "INTEGRATION_API_LEEWAY_SECONDS=0",
        ] {
            assert!(text.contains(key), "missing {key}");
        }
    }

    #[test]
    fn write_template_refuses_to_clobber() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config").join(DEFAULT_ENV_FILE);

        write_template(&path, false).expect("first write");
        assert!(path.exists());

        fs::write(&path, "INTEGRATION_API_SECRET=real\n").expect("customize");
        let err = write_template(&path, false).expect_err("should refuse");
        assert!(err.to_string().contains("--force"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "INTEGRATION_API_SECRET=real\n"
        );

        write_template(&path, true).expect("forced write");
        assert_eq!(fs::read_to_string(&path).unwrap(), template());
    }
}
