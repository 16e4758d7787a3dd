//! Static registry of required model artifacts.

use std::path::{Path, PathBuf};

/// One model artifact the pipeline cannot run without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactInfo {
    /// Human-readable name, used in status messages and missing lists.
    pub name: &'static str,
    /// File name under the LLM models directory.
    pub file_name: &'static str,
    /// Download source.
    pub url: &'static str,
}

impl ArtifactInfo {
    /// Where this artifact lives under `models_dir`.
    pub fn target_path(&self, models_dir: &Path) -> PathBuf {
        models_dir.join("llm").join(self.file_name)
    }
}

/// The closed set of artifacts the pipeline requires.
///
/// Whisper weights are fetched lazily by the pipeline itself; only the two
/// LLM weights are gated here because they are multi-gigabyte and the
/// pipeline fails opaquely without them.
pub const REQUIRED_ARTIFACTS: &[ArtifactInfo] = &[
    ArtifactInfo {
        name: "Context AI (Qwen)",
        file_name: "Qwen3-4B-Instruct-2507-Q6_K.gguf",
        url: "https://huggingface.co/unsloth/Qwen3-4B-Instruct-2507-GGUF/resolve/main/Qwen3-4B-Instruct-2507-Q6_K.gguf?download=true",
    },
    ArtifactInfo {
        name: "Translator AI (Sakura)",
        file_name: "GalTransl-v4-4B-2512.gguf",
        url: "https://huggingface.co/SakuraLLM/GalTransl-v4-4B-2512/resolve/main/GalTransl-v4-4B-2512.gguf?download=true",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_paths_land_under_the_llm_directory() {
        let models_dir = Path::new("/data/models");
        for artifact in REQUIRED_ARTIFACTS {
            let path = artifact.target_path(models_dir);
            assert!(path.starts_with("/data/models/llm"), "{path:?}");
            assert_eq!(
                path.file_name().unwrap().to_str().unwrap(),
                artifact.file_name
            );
        }
    }

    #[test]
    fn registry_names_and_files_are_distinct() {
        let mut names: Vec<_> = REQUIRED_ARTIFACTS.iter().map(|a| a.name).collect();
        names.dedup();
        assert_eq!(names.len(), REQUIRED_ARTIFACTS.len());

        let mut files: Vec<_> = REQUIRED_ARTIFACTS.iter().map(|a| a.file_name).collect();
        files.dedup();
        assert_eq!(files.len(), REQUIRED_ARTIFACTS.len());
    }
}
