//! Scripted passphrase providers shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use gemkey_core::{GemkeyError, GemkeyResult, SecureBytes};
use gemkey_secrets::{CredentialStore, PassphraseMode, PassphraseProvider, PassphraseResponse, StorePaths};

pub enum Step {
    Give(&'static str),
    Cancel,
    Fail,
}

/// Replays a fixed sequence of answers and records the modes it was asked for.
pub struct Scripted {
    steps: Mutex<VecDeque<Step>>,
    asked: Mutex<Vec<PassphraseMode>>,
}

impl Scripted {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into_iter().collect()),
            asked: Mutex::new(Vec::new()),
        })
    }

    pub fn asked(&self) -> Vec<PassphraseMode> {
        self.asked.lock().unwrap().clone()
    }
}

impl PassphraseProvider for Scripted {
    fn request(&self, mode: PassphraseMode) -> GemkeyResult<PassphraseResponse> {
        self.asked.lock().unwrap().push(mode);
        match self.steps.lock().unwrap().pop_front() {
            Some(Step::Give(p)) => Ok(PassphraseResponse::Given(SecureBytes::try_from_slice(
                p.as_bytes(),
            )?)),
            Some(Step::Cancel) => Ok(PassphraseResponse::Cancelled),
            Some(Step::Fail) => Err(GemkeyError::Storage(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "prompt device gone",
            ))),
            None => panic!("passphrase requested more often than scripted ({mode:?})"),
        }
    }
}

/// Answers every request with the same passphrase.
pub struct Always(pub &'static str);

impl PassphraseProvider for Always {
    fn request(&self, _mode: PassphraseMode) -> GemkeyResult<PassphraseResponse> {
        Ok(PassphraseResponse::Given(SecureBytes::try_from_slice(
            self.0.as_bytes(),
        )?))
    }
}

pub fn store_with(root: &Path, provider: Arc<dyn PassphraseProvider>) -> CredentialStore {
    CredentialStore::new(StorePaths::from_config_root(root), provider)
}

/// `"AIza"` followed by 35 `x`: a 39-byte key shaped like a Gemini API key.
pub fn sample_api_key() -> Vec<u8> {
    let mut key = b"AIza".to_vec();
    key.extend(std::iter::repeat(b'x').take(35));
    key
}
