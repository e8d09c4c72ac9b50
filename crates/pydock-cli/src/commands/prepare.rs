use pydock_build::ContextBuilder;
use std::path::PathBuf;

use super::BuildArgs;

pub async fn prepare(args: &BuildArgs) -> anyhow::Result<()> {
    let project_dir = PathBuf::from(".");
    let resolved = args.resolve(&project_dir)?;

    let rendered =
        ContextBuilder::new(&resolved.config).prepare(&args.artifact, &resolved.context_dir)?;

    println!(
        "Prepared build context at {}",
        resolved.context_dir.display()
    );
    for file in &rendered.staged_files {
        println!("  {}", file.display());
    }
    if !rendered.secrets.is_empty() {
        let names: Vec<&str> = rendered.secrets.names().collect();
        println!("Build secrets required: {}", names.join(", "));
    }

    Ok(())
}
