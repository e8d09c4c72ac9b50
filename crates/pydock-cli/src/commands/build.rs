use pydock_build::ContextBuilder;
use pydock_engine::{BuildRequest, ImageBuilder};
use std::path::PathBuf;

use super::BuildArgs;

/// Stage the context, then build it with the local engine.
pub async fn build(args: &BuildArgs, target: Option<String>) -> anyhow::Result<()> {
    let project_dir = PathBuf::from(".");
    let resolved = args.resolve(&project_dir)?;
    let image_name = resolved.image_name()?.to_owned();
    let image_tag = resolved.image_tag().to_owned();

    println!(
        "Preparing build context at {}...",
        resolved.context_dir.display()
    );
    let rendered =
        ContextBuilder::new(&resolved.config).prepare(&args.artifact, &resolved.context_dir)?;

    let mut request = BuildRequest::new(&resolved.context_dir, image_name, image_tag);
    if let Some(target) = target {
        request = request.with_target(target);
    }

    println!("Building {}...", request.image_ref());
    ImageBuilder::new()
        .build(&request, rendered.into_secrets())
        .await?;

    println!();
    println!("Built: {}", request.image_ref());
    Ok(())
}
