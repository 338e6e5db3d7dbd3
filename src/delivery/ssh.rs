// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! SSH transport for the remote push sink.
//!
//! Sessions authenticate with a single private key. Files are written through the
//! SCP sink protocol (`scp -t`) and commands run on their own exec channel.
//!
//! Host keys are accepted without verification. The DNS host is reached on a
//! private CI network and its key is not distributed alongside the credentials.

use super::remote::{RemoteConnector, RemoteSession, RemoteTarget};
use crate::errors::DeliveryError;
use async_trait::async_trait;
use russh::client::{self, Handle};
use russh::keys::ssh_key::PublicKey;
use russh::keys::{decode_secret_key, PrivateKeyWithHashAlg};
use russh::{Channel, ChannelMsg, Disconnect};
use std::sync::Arc;
use tracing::debug;

/// Client handler that accepts any server host key.
struct AcceptingClient;

impl client::Handler for AcceptingClient {
    type Error = russh::Error;

    async fn check_server_key(&mut self, _server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// Opens SSH sessions with `russh`.
#[derive(Clone, Default)]
pub struct SshConnector {
    config: Arc<client::Config>,
}

impl SshConnector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RemoteConnector for SshConnector {
    async fn connect(
        &self,
        target: &RemoteTarget,
        private_key: &str,
    ) -> Result<Box<dyn RemoteSession>, DeliveryError> {
        let host = target.address();
        let connect_error = |reason: String| DeliveryError::Connect {
            host: host.clone(),
            reason,
        };

        let key = decode_secret_key(private_key, None).map_err(|e| DeliveryError::Credential {
            path: target.private_key_path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut handle = client::connect(
            self.config.clone(),
            (target.host.as_str(), target.port),
            AcceptingClient,
        )
        .await
        .map_err(|e| connect_error(e.to_string()))?;

        let hash_alg = handle
            .best_supported_rsa_hash()
            .await
            .map_err(|e| connect_error(e.to_string()))?
            .flatten();
        let auth = handle
            .authenticate_publickey(
                target.user.clone(),
                PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg),
            )
            .await
            .map_err(|e| connect_error(e.to_string()))?;
        if !auth.success() {
            return Err(connect_error(format!(
                "public key authentication rejected for user '{}'",
                target.user
            )));
        }

        debug!(host = %host, user = %target.user, "SSH session established");
        Ok(Box::new(SshSession { handle, host }))
    }
}

struct SshSession {
    handle: Handle<AcceptingClient>,
    host: String,
}

impl SshSession {
    async fn open_exec(&self, command: &str) -> Result<Channel<client::Msg>, russh::Error> {
        let channel = self.handle.channel_open_session().await?;
        channel.exec(true, command).await?;
        Ok(channel)
    }

    /// Send `content` through an `scp -t` sink running on the remote host.
    async fn scp(&self, path: &str, mode: u32, content: &[u8]) -> Result<(), String> {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        let mut channel = self
            .open_exec(&format!("scp -t {path}"))
            .await
            .map_err(|e| e.to_string())?;

        read_ack(&mut channel).await?;

        let header = format!("C{:04o} {} {}\n", mode & 0o7777, content.len(), file_name);
        channel
            .data(header.as_bytes())
            .await
            .map_err(|e| e.to_string())?;
        read_ack(&mut channel).await?;

        channel.data(content).await.map_err(|e| e.to_string())?;
        channel.data(&[0u8][..]).await.map_err(|e| e.to_string())?;
        read_ack(&mut channel).await?;

        channel.eof().await.map_err(|e| e.to_string())?;
        exit_result(wait_exit(&mut channel).await, &[]).map_err(|reason| format!("scp {reason}"))
    }
}

/// Read one SCP acknowledgement byte. Anything but `\0` carries an error message.
async fn read_ack(channel: &mut Channel<client::Msg>) -> Result<(), String> {
    loop {
        match channel.wait().await {
            Some(ChannelMsg::Data { data }) => {
                return match data.first() {
                    Some(0) => Ok(()),
                    Some(_) => Err(String::from_utf8_lossy(&data[1..]).trim().to_string()),
                    None => continue,
                };
            }
            Some(ChannelMsg::ExitStatus { exit_status }) => {
                return Err(format!("scp exited with status {exit_status}"));
            }
            Some(ChannelMsg::Eof | ChannelMsg::Close) | None => {
                return Err("channel closed before acknowledgement".to_string());
            }
            Some(_) => {}
        }
    }
}

/// Drain a channel until it closes, returning the exit status if one was sent.
async fn wait_exit(channel: &mut Channel<client::Msg>) -> Option<u32> {
    let mut status = None;
    while let Some(msg) = channel.wait().await {
        if let ChannelMsg::ExitStatus { exit_status } = msg {
            status = Some(exit_status);
        }
    }
    status
}

/// Map a remote exit status to a result. A channel that closes without reporting a
/// status is a failure.
fn exit_result(status: Option<u32>, stderr: &[u8]) -> Result<(), String> {
    match status {
        Some(0) => Ok(()),
        Some(code) => {
            let output = String::from_utf8_lossy(stderr);
            let output = output.trim();
            if output.is_empty() {
                Err(format!("exit status {code}"))
            } else {
                Err(format!("exit status {code}: {output}"))
            }
        }
        None => Err("no exit status received".to_string()),
    }
}

#[async_trait]
impl RemoteSession for SshSession {
    async fn upload(&mut self, path: &str, mode: u32, content: &[u8]) -> Result<(), DeliveryError> {
        self.scp(path, mode, content)
            .await
            .map_err(|reason| DeliveryError::Transfer {
                host: self.host.clone(),
                path: path.to_string(),
                reason,
            })
    }

    async fn exec(&mut self, command: &str) -> Result<(), DeliveryError> {
        let command_error = |reason: String| DeliveryError::RemoteCommand {
            host: self.host.clone(),
            command: command.to_string(),
            reason,
        };

        let mut channel = self
            .open_exec(command)
            .await
            .map_err(|e| command_error(e.to_string()))?;

        let mut stderr = Vec::new();
        let mut status = None;
        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::ExtendedData { data, .. } => stderr.extend_from_slice(&data),
                ChannelMsg::ExitStatus { exit_status } => status = Some(exit_status),
                _ => {}
            }
        }

        exit_result(status, &stderr).map_err(command_error)
    }

    async fn close(&mut self) -> Result<(), DeliveryError> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "English")
            .await
            .map_err(|e| DeliveryError::Connect {
                host: self.host.clone(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
#[path = "ssh_tests.rs"]
mod ssh_tests;
