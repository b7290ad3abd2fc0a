use crate::error::RunError;
use crate::services::layout::RunLayout;
use std::io::BufRead;
use std::path::Path;

/// Clears and recreates the run tree.
///
/// An existing run directory is removed first; with `interactive` set the
/// `confirm` policy must agree, otherwise the run aborts with
/// [`RunError::UserAbort`] and the directory is left as it was. The maps
/// directory and one `It_<i>` directory per planned iteration exist on return.
pub fn prepare_workspace(
    layout: &RunLayout,
    interactive: bool,
    max_iterations: i64,
    mut confirm: impl FnMut(&Path) -> bool,
) -> anyhow::Result<()> {
    let root = layout.root();
    if root.exists() {
        if interactive && !confirm(root) {
            return Err(RunError::UserAbort(root.to_path_buf()).into());
        }
        log::info!("removing previous run at {}", root.display());
        std::fs::remove_dir_all(root)?;
    }

    std::fs::create_dir_all(root)?;
    std::fs::create_dir_all(layout.maps_dir())?;
    for i in 0..max_iterations.max(0) as usize {
        std::fs::create_dir_all(layout.iteration_dir(i))?;
    }
    Ok(())
}

/// Blocking terminal confirmation. Only an exact `Y` accepts.
pub fn prompt_overwrite(dir: &Path) -> bool {
    eprintln!(
        "The output dir {} already has a brainviset simulation. Proceeding will delete it.",
        dir.display()
    );
    eprint!(" Write 'Y' to delete it: ");
    let mut line = String::new();
    let stdin = std::io::stdin();
    if stdin.lock().read_line(&mut line).is_err() {
        return false;
    }
    eprintln!("You can disable this prompt by deactivating interactive mode in the config file.");
    line.trim_end_matches(['\r', '\n']) == "Y"
}
