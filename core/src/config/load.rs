use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default snipbox data directory: ~/.snipbox
pub fn get_snipbox_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".snipbox"))
}

/// Load an explicit config file, then apply environment overrides.
pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("read {}: {e}", path.display()))?;
    let mut cfg = toml::from_str::<AppConfig>(&s)?;
    apply_env_overrides(&mut cfg, |k| std::env::var(k).ok());
    finish(&mut cfg);
    Ok(cfg)
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.snipbox/config.toml (highest)
    let user_config = get_snipbox_data_dir().ok().map(|d| d.join("config.toml"));

    // Priority 2: ./.snipbox.toml (current directory)
    let local_config = Path::new(".snipbox.toml");

    let mut cfg: AppConfig = match user_config.filter(|p| p.exists()) {
        Some(path) => toml::from_str(&std::fs::read_to_string(&path)?)?,
        None if local_config.exists() => toml::from_str(&std::fs::read_to_string(local_config)?)?,
        None => AppConfig::default(),
    };

    // Environment variable overrides (Priority 0: highest)
    apply_env_overrides(&mut cfg, |k| std::env::var(k).ok());
    finish(&mut cfg);
    Ok(cfg)
}

/// Apply `SNIPBOX_*` overrides. `lookup` is injected so tests need not touch the process env.
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("SNIPBOX_ROOT") {
        cfg.registry.root = v;
    }
    if let Some(v) = get("SNIPBOX_SANDBOX_PROGRAM") {
        cfg.sandbox.program = v;
    }
    if let Some(v) = get("SNIPBOX_TIMEOUT_MS").and_then(|v| v.trim().parse().ok()) {
        cfg.executor.timeout_ms = v;
    }
    if let Some(v) = get("SNIPBOX_MAX_PARALLEL").and_then(|v| v.trim().parse().ok()) {
        cfg.executor.max_parallel = v;
    }
}

fn finish(cfg: &mut AppConfig) {
    cfg.registry.root = shellexpand::tilde(&cfg.registry.root).into_owned();
    for path in [&mut cfg.sandbox.workdir, &mut cfg.sandbox.prelude_path]
        .into_iter()
        .flatten()
    {
        *path = shellexpand::tilde(path.as_str()).into_owned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_win_and_ignore_garbage() {
        let env: HashMap<&str, &str> = [
            ("SNIPBOX_ROOT", "/srv/snippets"),
            ("SNIPBOX_TIMEOUT_MS", "1500"),
            ("SNIPBOX_MAX_PARALLEL", "not-a-number"),
            ("SNIPBOX_SANDBOX_PROGRAM", "  "),
        ]
        .into_iter()
        .collect();

        let mut cfg = AppConfig::default();
        apply_env_overrides(&mut cfg, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.registry.root, "/srv/snippets");
        assert_eq!(cfg.executor.timeout_ms, 1500);
        assert_eq!(cfg.executor.max_parallel, 1);
        assert_eq!(cfg.sandbox.program, "node");
    }

    #[test]
    fn loads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[report]\nformat = \"json\"\npretty = true\n").unwrap();

        let cfg = load_from_path(&path).unwrap();
        assert_eq!(cfg.report.format, "json");
        assert!(cfg.report.pretty);
    }

    #[test]
    fn tilde_paths_are_expanded() {
        let mut cfg = AppConfig::default();
        cfg.registry.root = "~/snippets".into();
        cfg.sandbox.workdir = Some("~/scratch".into());
        finish(&mut cfg);

        let home = shellexpand::tilde("~").into_owned();
        assert_eq!(cfg.registry.root, format!("{home}/snippets"));
        assert_eq!(cfg.sandbox.workdir, Some(format!("{home}/scratch")));
        assert_eq!(cfg.sandbox.prelude_path, None);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("absent.toml")).is_err());
    }
}
