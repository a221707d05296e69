use crate::cli::InfoArgs;
use crate::config::Config;
use crate::dependency::absolutize;
use crate::formatter::format_info;
use crate::info::{find_repo_root, get_component_info, GetComponentInfoOptions};
use anyhow::{Context, Result};
use std::path::Path;

/// Print the ComponentInfo of one file as JSON on stdout
pub fn run_info(args: &InfoArgs, root: &Path, verbose: bool) -> Result<()> {
    let root = absolutize(root).context("Failed to resolve project root")?;
    let config = Config::load(&root);

    let file = root.join(&args.file);
    let mut options = GetComponentInfoOptions::new(&file)
        .ignore_parent_interfaces(args.resolve.ignored_parent_interfaces(&config))
        .with_repo_root(find_repo_root(&file).unwrap_or_else(|| root.clone()));
    if let Some(tsconfig) = args.resolve.tsconfig_path(&config, &root) {
        options = options.with_tsconfig(tsconfig);
    }

    let info = get_component_info(&options)?;
    if verbose {
        eprintln!(
            "{}: {} props ({})",
            info.display_name,
            info.props.len(),
            info.file.repo_path
        );
    }

    print!("{}", format_info(&info, args.compact)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ResolveOptions;
    use crate::error::DocgenError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_info_reports_component_errors() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("Label.tsx"),
            "export const Label = () => <span />;\n",
        )
        .unwrap();

        let args = InfoArgs {
            file: "Label.tsx".into(),
            compact: true,
            resolve: ResolveOptions::default(),
        };
        let err = run_info(&args, temp_dir.path(), false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DocgenError>(),
            Some(DocgenError::MissingDefaultExport { .. })
        ));
    }

    #[test]
    fn test_info_succeeds_for_valid_component() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("Label.tsx"),
            "export const Label = (props: { text?: string }) => <span />;\nexport default Label;\n",
        )
        .unwrap();

        let args = InfoArgs {
            file: "Label.tsx".into(),
            ..Default::default()
        };
        assert!(run_info(&args, temp_dir.path(), true).is_ok());
    }
}
