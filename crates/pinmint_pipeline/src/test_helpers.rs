use pinmint_core::prelude::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub fn identity() -> SigningIdentity {
    SigningIdentity::new(Address::new("creator"), vec![7; 32])
}

/// Records every pinned file and answers from a script, then with `Qma`.
#[derive(Clone, Default)]
pub struct RecordingPinner {
    pinned: Arc<Mutex<Vec<GenericFile>>>,
    script: Arc<Mutex<VecDeque<Result<ContentId, u16>>>>,
}

impl RecordingPinner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answering(script: Vec<Result<&str, u16>>) -> Self {
        let pinner = Self::default();
        *pinner.script.lock().unwrap() = script
            .into_iter()
            .map(|answer| answer.map(ContentId::new))
            .collect();
        pinner
    }

    pub fn pinned(&self) -> Vec<GenericFile> {
        self.pinned.lock().unwrap().clone()
    }
}

impl Pinner for RecordingPinner {
    async fn pin(&self, file: GenericFile) -> Result<ContentId, PinError> {
        self.pinned.lock().unwrap().push(file);

        match self.script.lock().unwrap().pop_front() {
            Some(Ok(cid)) => Ok(cid),
            Some(Err(status)) => Err(PinError::Rejected {
                status,
                message: "scripted failure".into(),
            }),
            None => Ok(ContentId::new("Qma")),
        }
    }
}

pub async fn write_image(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("image.jpg");
    tokio::fs::write(&path, b"0123456789").await.unwrap();
    path
}
