use std::path::PathBuf;
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the logs directory: `<exe_dir>/logs/`
pub fn get_logs_dir() -> PathBuf {
    get_exe_dir().join("logs")
}

/// Returns the output directory for dashboard snapshots: `<exe_dir>/output/`
pub fn get_output_dir() -> PathBuf {
    get_exe_dir().join("output")
}

/// Returns the reference art directory: `<exe_dir>/cards/templates/`
pub fn get_templates_dir() -> PathBuf {
    get_exe_dir().join("cards").join("templates")
}

/// Returns the directory for operator-confirmed images: `<exe_dir>/cards/templates-user/`
pub fn get_learned_templates_dir() -> PathBuf {
    get_exe_dir().join("cards").join("templates-user")
}

/// Returns the default replay input directory: `<exe_dir>/frames/`
pub fn get_frames_dir() -> PathBuf {
    get_exe_dir().join("frames")
}

/// Ensures all output directories exist. Call at startup.
pub fn ensure_directories() -> std::io::Result<()> {
    std::fs::create_dir_all(get_logs_dir())?;
    std::fs::create_dir_all(get_output_dir())?;
    std::fs::create_dir_all(get_learned_templates_dir())?;
    Ok(())
}
