use crate::domain::constants::MAX_ITERATIONS_LIMIT;
use crate::domain::models::{ConfigFile, RunConfig, ScannerConfig};
use crate::services::layout::preprocessed_reference;
use std::path::{Path, PathBuf};

pub fn load_config(path: &Path) -> anyhow::Result<RunConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read config {}: {}", path.display(), e))?;
    let file: ConfigFile = toml::from_str(&raw)?;
    let base = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    resolve(file, &base)
}

fn under(base: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

/// Rejects iteration counts above [`MAX_ITERATIONS_LIMIT`]. Values below 1 are
/// accepted and mean "no iterations".
pub fn check_max_iterations(n: i64) -> anyhow::Result<i64> {
    if n > MAX_ITERATIONS_LIMIT {
        anyhow::bail!(
            "maximum iteration count {} exceeds the limit of {}",
            n,
            MAX_ITERATIONS_LIMIT
        );
    }
    Ok(n)
}

/// Turns the file schema into the immutable run parameters. Relative paths
/// are taken relative to `base`, the directory holding the config file.
pub fn resolve(file: ConfigFile, base: &Path) -> anyhow::Result<RunConfig> {
    let params = file.params;
    if params.patient_dirname.trim().is_empty() {
        anyhow::bail!("params.patient_dirname must not be empty");
    }
    if params.output_dir.trim().is_empty() {
        anyhow::bail!("params.output_dir must not be empty");
    }
    let max_iterations = check_max_iterations(params.maximum_iteration)?;

    let data_dir = under(
        base,
        &file.dir_data_path.unwrap_or_else(|| PathBuf::from("Data")),
    );
    let results_dir = under(
        base,
        &file.dir_results_path.unwrap_or_else(|| PathBuf::from("Results")),
    );

    let patient_dir = data_dir.join(&params.patient_dirname);
    let pet_image = patient_dir.join(&params.pet_image);
    let ct_image = params
        .ct_image
        .filter(|c| !c.trim().is_empty())
        .map(|c| patient_dir.join(c));

    Ok(RunConfig {
        reference_image: preprocessed_reference(&pet_image),
        mri_image: patient_dir.join(&params.mri_image),
        pet_image,
        ct_image,
        patient_dirname: params.patient_dirname,
        scanner: ScannerConfig {
            name: params.scanner,
            recons_type: file.scanner.recons_type,
            recons_iterations: file.scanner.number_of_iterations,
            axial_fov: file.scanner.axial_fov,
        },
        sim_type: params.sim_type,
        max_iterations,
        interactive: file.interactive_mode,
        output_dir: results_dir.join(&params.output_dir),
        results_dir,
        tools: file.tools,
    })
}

#[cfg(test)]
mod tests {
    use super::{check_max_iterations, load_config, resolve};
    use crate::domain::constants::MAX_ITERATIONS_LIMIT;
    use crate::domain::models::ConfigFile;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
interactive_mode = true

[params]
patient_dirname = "patient01"
pet_image = "pet.img"
mri_image = "mri.img"
ct_image = ""
output_dir = "run1"
maximum_iteration = 4
scanner = "GE_Discovery_ST"

[scanner]
recons_type = "OSEM3D"
number_of_iterations = 3
axial_fov = 15.7

[tools.initializer]
program = "petmr2maps"
args = ["{pet}", "{mri}", "{maps_dir}"]

[tools.engine]
program = "simset-run"

[tools.similarity]
program = "corrcoef"
args = ["{reference}", "{candidate}"]

[tools.updater]
program = "update-act-map"
"#;

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let file: ConfigFile = toml::from_str(SAMPLE).unwrap();
        let cfg = resolve(file, Path::new("/srv/viset")).unwrap();
        assert_eq!(
            cfg.pet_image,
            PathBuf::from("/srv/viset/Data/patient01/pet.img")
        );
        assert_eq!(
            cfg.reference_image,
            PathBuf::from("/srv/viset/Data/patient01/rpet.hdr")
        );
        assert_eq!(cfg.output_dir, PathBuf::from("/srv/viset/Results/run1"));
        assert_eq!(cfg.ct_image, None);
        assert_eq!(cfg.max_iterations, 4);
        assert!(cfg.interactive);
        assert_eq!(cfg.scanner.recons_iterations, 3);
        assert!(cfg.tools.engine.args.is_empty());
    }

    #[test]
    fn explicit_dirs_and_ct_are_honoured() {
        let raw = SAMPLE
            .replace("ct_image = \"\"", "ct_image = \"ct.img\"")
            .replace(
                "interactive_mode = true",
                "dir_data_path = \"/data\"\ndir_results_path = \"/results\"",
            );
        let file: ConfigFile = toml::from_str(&raw).unwrap();
        let cfg = resolve(file, Path::new("/srv/viset")).unwrap();
        assert_eq!(cfg.ct_image, Some(PathBuf::from("/data/patient01/ct.img")));
        assert_eq!(cfg.output_dir, PathBuf::from("/results/run1"));
        assert!(!cfg.interactive);
    }

    #[test]
    fn missing_tool_section_is_rejected() {
        let raw = SAMPLE.replace("[tools.updater]\nprogram = \"update-act-map\"\n", "");
        assert!(toml::from_str::<ConfigFile>(&raw).is_err());
    }

    #[test]
    fn load_reads_from_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("brainviset.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.results_dir, tmp.path().join("Results"));
        assert!(load_config(&tmp.path().join("missing.toml")).is_err());
    }

    #[test]
    fn iteration_count_is_bounded() {
        assert_eq!(
            check_max_iterations(MAX_ITERATIONS_LIMIT).unwrap(),
            MAX_ITERATIONS_LIMIT
        );
        assert_eq!(check_max_iterations(-3).unwrap(), -3);
        let err = check_max_iterations(MAX_ITERATIONS_LIMIT + 1).unwrap_err();
        assert!(err.to_string().contains("exceeds the limit"));

        let raw = SAMPLE.replace("maximum_iteration = 4", "maximum_iteration = 1000000000000");
        let file: ConfigFile = toml::from_str(&raw).unwrap();
        let err = resolve(file, Path::new("/srv/viset")).unwrap_err();
        assert!(err.to_string().contains("1000000000000"));
    }
}
