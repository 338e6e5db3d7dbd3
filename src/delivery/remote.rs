// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Remote push sink: copy the rendered hosts file to a DNS host, then reload dnsmasq.
//!
//! The transport is abstracted behind [`RemoteConnector`] and [`RemoteSession`] so
//! the push sequence can be exercised without a live host. [`super::SshConnector`]
//! is the production transport.
//!
//! # Sequence
//!
//! 1. Read the private key from `private_key_path`
//! 2. Open a session to `host:port` as `user`
//! 3. Upload the document to `remote_path` with `file_mode`
//! 4. Run `reload_command`
//! 5. Close the session
//!
//! Each step maps its failure to a distinct [`DeliveryError`] variant.

use super::{with_timeout, DeliveryOutcome, Sink};
use crate::constants::{
    DEFAULT_PRIVATE_KEY_PATH, DEFAULT_RELOAD_COMMAND, DEFAULT_REMOTE_FILE_MODE,
    DEFAULT_REMOTE_HOSTS_PATH, DEFAULT_SSH_USER, SSH_PORT,
};
use crate::errors::DeliveryError;
use crate::render::RenderProfile;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where and how to push the hosts file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub private_key_path: PathBuf,
    pub remote_path: String,
    pub file_mode: u32,
    pub reload_command: String,
}

impl RemoteTarget {
    /// Target `host` with every other field at its default.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: SSH_PORT,
            user: DEFAULT_SSH_USER.to_string(),
            private_key_path: PathBuf::from(DEFAULT_PRIVATE_KEY_PATH),
            remote_path: DEFAULT_REMOTE_HOSTS_PATH.to_string(),
            file_mode: DEFAULT_REMOTE_FILE_MODE,
            reload_command: DEFAULT_RELOAD_COMMAND.to_string(),
        }
    }

    /// `host:port`, used in logs and errors.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Opens authenticated sessions to a remote host.
#[async_trait]
pub trait RemoteConnector: Send + Sync {
    /// Connect and authenticate with the PEM/OpenSSH encoded `private_key`.
    ///
    /// # Errors
    ///
    /// [`DeliveryError::Credential`] if the key cannot be used,
    /// [`DeliveryError::Connect`] if the host is unreachable or rejects the key.
    async fn connect(
        &self,
        target: &RemoteTarget,
        private_key: &str,
    ) -> Result<Box<dyn RemoteSession>, DeliveryError>;
}

/// An open session on a remote host.
#[async_trait]
pub trait RemoteSession: Send {
    /// Write `content` to `path` with permission bits `mode`.
    async fn upload(&mut self, path: &str, mode: u32, content: &[u8]) -> Result<(), DeliveryError>;

    /// Run `command` and wait for it to exit successfully.
    async fn exec(&mut self, command: &str) -> Result<(), DeliveryError>;

    /// Close the session.
    async fn close(&mut self) -> Result<(), DeliveryError>;
}

/// Pushes the rendered hosts file over a [`RemoteConnector`].
pub struct RemotePushSink<C> {
    connector: C,
    target: RemoteTarget,
    timeout: Duration,
}

impl<C: RemoteConnector> RemotePushSink<C> {
    pub fn new(connector: C, target: RemoteTarget, timeout: Duration) -> Self {
        Self {
            connector,
            target,
            timeout,
        }
    }

    #[must_use]
    pub fn target(&self) -> &RemoteTarget {
        &self.target
    }

    async fn read_private_key(&self) -> Result<String, DeliveryError> {
        tokio::fs::read_to_string(&self.target.private_key_path)
            .await
            .map_err(|e| DeliveryError::Credential {
                path: self.target.private_key_path.display().to_string(),
                reason: e.to_string(),
            })
    }

    async fn push(&self, document: &str) -> Result<DeliveryOutcome, DeliveryError> {
        let private_key = self.read_private_key().await?;

        debug!(host = %self.target.address(), user = %self.target.user, "Opening remote session");
        let mut session = self.connector.connect(&self.target, &private_key).await?;

        // The session is closed whether or not the upload and reload succeeded
        let result = self.upload_and_reload(session.as_mut(), document).await;
        if let Err(e) = session.close().await {
            warn!(host = %self.target.address(), error = %e, "Failed to close remote session cleanly");
        }
        result?;

        info!(
            host = %self.target.address(),
            path = %self.target.remote_path,
            "Pushed hosts file and reloaded dnsmasq"
        );
        Ok(DeliveryOutcome::Pushed)
    }

    async fn upload_and_reload(
        &self,
        session: &mut dyn RemoteSession,
        document: &str,
    ) -> Result<(), DeliveryError> {
        session
            .upload(
                &self.target.remote_path,
                self.target.file_mode,
                document.as_bytes(),
            )
            .await?;
        debug!(
            host = %self.target.address(),
            path = %self.target.remote_path,
            bytes = document.len(),
            "Uploaded hosts file"
        );

        session.exec(&self.target.reload_command).await
    }
}

#[async_trait]
impl<C: RemoteConnector> Sink for RemotePushSink<C> {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn render_profile(&self) -> RenderProfile {
        RenderProfile::remote_hosts()
    }

    async fn deliver(
        &self,
        document: &str,
        _records: usize,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        with_timeout(self.name(), self.timeout, self.push(document)).await
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod remote_tests;
