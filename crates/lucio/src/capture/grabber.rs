use std::process::{Command, Stdio};

use crate::adapters::ScreenImage;
use crate::error::CaptureError;

/// Takes one screenshot.
pub trait FrameGrabber: Send + Sync {
    fn grab(&self) -> Result<ScreenImage, CaptureError>;
}

/// Runs an external screenshot tool that writes a PNG or JPEG to stdout,
/// e.g. `grim -` or `screencapture -x -t png /dev/stdout`.
#[derive(Debug, Clone)]
pub struct CommandGrabber {
    program: String,
    args: Vec<String>,
}

impl CommandGrabber {
    pub fn new(command: &[String]) -> Result<Self, CaptureError> {
        let (program, args) = command.split_first().ok_or(CaptureError::NoCommand)?;
        if program.trim().is_empty() {
            return Err(CaptureError::NoCommand);
        }
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl FrameGrabber for CommandGrabber {
    fn grab(&self) -> Result<ScreenImage, CaptureError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| CaptureError::Spawn {
                command: self.program.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(CaptureError::CommandFailed {
                command: self.program.clone(),
                status: output.status.to_string(),
            });
        }

        match image::guess_format(&output.stdout) {
            Ok(image::ImageFormat::Png) | Ok(image::ImageFormat::Jpeg) => {
                Ok(ScreenImage::new(output.stdout))
            }
            _ => Err(CaptureError::NotAnImage),
        }
    }
}
