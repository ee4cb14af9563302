//! The `upload` command: copy a ROM to the device, verify it, optionally boot.

use std::path::Path;

use anyhow::{Context, Result, bail};
use usb2snes::path;

/// Arguments for `usb2snes upload`.
///
/// Usage: `usb2snes upload [OPTIONS] SOURCE [DESTINATION]`
#[derive(Debug, clap::Args)]
pub struct UploadArgs {
    /// Boot the file after uploading.
    #[arg(short = 'b', long)]
    pub boot: bool,

    /// Always upload, even if the file already exists.
    #[arg(short = 'f', long, conflicts_with = "ignore")]
    pub force: bool,

    /// Skip the upload without error if the file already exists.
    #[arg(short = 'i', long)]
    pub ignore: bool,

    /// Directory on the device to store the file in. Takes precedence over DESTINATION.
    #[arg(short = 'd', long)]
    pub dir: Option<String>,

    /// Local file to upload.
    pub source: String,

    /// usb2snes path to upload to.
    pub destination: Option<String>,
}

/// What to do when the destination already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Existing {
    /// Fail.
    Error,
    /// Upload anyway.
    Overwrite,
    /// Leave it alone.
    Skip,
}

impl UploadArgs {
    fn on_existing(&self) -> Existing {
        if self.force {
            Existing::Overwrite
        } else if self.ignore {
            Existing::Skip
        } else {
            Existing::Error
        }
    }
}

/// Base name of a local path as a string.
fn basename(source: &str) -> Result<String> {
    Path::new(source)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{source} has no file name"))
}

/// Works out the usb2snes path: `DIR/basename(SOURCE)` or `DESTINATION`.
fn destination(args: &UploadArgs) -> Result<String> {
    if let Some(dir) = &args.dir {
        return Ok(path::join(dir, &basename(&args.source)?));
    }
    match &args.destination {
        Some(dest) => Ok(dest.clone()),
        None => bail!("expected a --dir (-d) or destination argument"),
    }
}

pub async fn run(address: &str, args: UploadArgs) -> Result<()> {
    let dest = destination(&args)?;
    let name = basename(&args.source)?;
    path::check(&dest).map_err(|reason| anyhow::anyhow!("{dest}: {reason}"))?;

    let (mut client, device) = crate::connect_attached(address).await?;

    let exists = client.file_exists(&dest).await?;
    let upload = if exists {
        match args.on_existing() {
            Existing::Overwrite => true,
            Existing::Skip => false,
            Existing::Error => bail!("file already exists on device: {dest}"),
        }
    } else {
        true
    };
    if exists {
        println!("{dest} already exists on {device}");
    }

    if upload {
        println!("Uploading {name} to {device}");
        let bytes = client
            .put_file(&args.source, &dest)
            .await
            .with_context(|| format!("cannot upload {}", args.source))?;
        tracing::debug!(bytes, %dest, "upload sent");

        // The protocol has no transfer ack; listing forces the daemon to finish.
        if !client.file_exists(&dest).await? {
            bail!("file was not uploaded to device");
        }
    }

    if args.boot {
        println!("Booting {dest}");
        client.boot(&dest).await?;
    }

    crate::close(client).await;
    Ok(())
}
