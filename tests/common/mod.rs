#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Engine stand-in: writes line `iteration + 1` of the scores file into both
/// reconstruction files. A `missing` line leaves no artifact behind.
const ENGINE_SCRIPT: &str = r#"line=$(sed -n "$(($3+1))p" "$4"); [ "$line" = missing ] && exit 0; mkdir -p "$(dirname "$1")"; echo "$line" > "$1"; echo "$line" > "$2""#;

pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
    pub config: PathBuf,
}

pub struct EnvOptions<'a> {
    pub scores: &'a [&'a str],
    pub max_iterations: i64,
    pub interactive: bool,
    pub similarity_program: &'a str,
}

impl Default for EnvOptions<'_> {
    fn default() -> Self {
        Self {
            scores: &[],
            max_iterations: 3,
            interactive: false,
            similarity_program: "cat",
        }
    }
}

impl TestEnv {
    pub fn new(scores: &[&str], max_iterations: i64) -> Self {
        Self::with(EnvOptions {
            scores,
            max_iterations,
            ..EnvOptions::default()
        })
    }

    pub fn with(opts: EnvOptions<'_>) -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        let patient = root.join("Data/patient01");
        fs::create_dir_all(&patient).expect("create patient dir");
        for name in ["pet.img", "mri.img", "rpet.hdr"] {
            fs::write(patient.join(name), name).expect("write image");
        }

        let scores = root.join("scores.txt");
        fs::write(&scores, format!("{}\n", opts.scores.join("\n"))).expect("write scores");

        let config = root.join("brainviset.toml");
        fs::write(&config, config_toml(&opts, &scores)).expect("write config");

        Self {
            _tmp: tmp,
            root,
            config,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("brainviset");
        cmd.env("RUST_LOG", "warn")
            .arg("--config")
            .arg(&self.config);
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join("Results/run1")
    }

    pub fn activity_map(&self, iteration: usize) -> PathBuf {
        self.output_dir()
            .join("Maps")
            .join(format!("act_map_{}.hdr", iteration))
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.output_dir().join(rel)).unwrap_or_default()
    }
}

fn config_toml(opts: &EnvOptions<'_>, scores: &Path) -> String {
    format!(
        r#"interactive_mode = {interactive}

[params]
patient_dirname = "patient01"
pet_image = "pet.img"
mri_image = "mri.img"
output_dir = "run1"
maximum_iteration = {max}
scanner = "GE_Discovery_ST"
sim_type = "SimSET"

[scanner]
recons_type = "OSEM3D"
number_of_iterations = 3
axial_fov = 15.7

[tools.initializer]
program = "sh"
args = ["-c", 'echo act > "$1"; echo att > "$2"', "_", "{{act_map}}", "{{att_map}}"]

[tools.engine]
program = "sh"
args = ["-c", '{engine}', "_", "{{reconstruction}}", "{{registered}}", "{{iteration}}", "{scores}"]

[tools.similarity]
program = "{similarity}"
args = ["{{candidate}}"]

[tools.updater]
program = "sh"
args = ["-c", 'cp "$1" "$2"', "_", "{{previous}}", "{{output}}"]
"#,
        interactive = opts.interactive,
        max = opts.max_iterations,
        engine = ENGINE_SCRIPT,
        scores = scores.display(),
        similarity = opts.similarity_program,
    )
}
