use ras_types::ras_proto::{
    AuthenticateAgentRequest, AuthenticateInfobaseRequest, ClusterAuthenticateRequest,
    CreateInfobaseRequest, DropInfobaseRequest, GetClusterInfoRequest, GetClustersRequest,
    GetInfobaseSessionsRequest, GetInfobasesShortRequest, GetSessionsRequest, LockInfobaseRequest,
    TerminateSessionRequest, UnlockInfobaseRequest, UpdateInfobaseRequest,
};
use std::fmt::Debug;

/// Replaces every non-empty credential in a logged copy.
pub const MASK: &str = "******";

/// Identifying context of a call, as written to audit records. Empty strings
/// are treated as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuditMetadata {
    pub cluster_id: Option<String>,
    pub infobase_id: Option<String>,
    pub user: Option<String>,
}

impl AuditMetadata {
    pub fn new(cluster_id: &str, infobase_id: Option<&str>, user: Option<&str>) -> Self {
        fn present(value: Option<&str>) -> Option<String> {
            value.filter(|v| !v.is_empty()).map(str::to_string)
        }
        Self {
            cluster_id: present(Some(cluster_id)),
            infobase_id: present(infobase_id),
            user: present(user),
        }
    }
}

/// Audit and redaction knowledge about one request message type. Each
/// implementation lists its own credential fields.
pub trait AuditFields: Clone + Debug + Send + Sync {
    fn audit_metadata(&self) -> AuditMetadata;

    fn redact_credentials(&mut self);

    /// A deep copy with the credentials masked. `self` is left as it was.
    fn sanitized(&self) -> Self {
        let mut copy = self.clone();
        copy.redact_credentials();
        copy
    }
}

/// Object-safe view of a request message handed to interceptor stages.
pub trait InboundMessage: Debug + Send + Sync {
    fn metadata(&self) -> AuditMetadata;

    fn sanitized_view(&self) -> Box<dyn Debug + Send + Sync>;
}

impl<T: AuditFields + 'static> InboundMessage for T {
    fn metadata(&self) -> AuditMetadata {
        self.audit_metadata()
    }

    fn sanitized_view(&self) -> Box<dyn Debug + Send + Sync> {
        Box::new(self.sanitized())
    }
}

fn mask(value: &mut Option<String>) {
    if let Some(secret) = value {
        mask_present(secret);
    }
}

fn mask_present(secret: &mut String) {
    if !secret.is_empty() {
        *secret = MASK.to_string();
    }
}

impl AuditFields for CreateInfobaseRequest {
    fn audit_metadata(&self) -> AuditMetadata {
        AuditMetadata::new(&self.cluster_id, None, self.cluster_user.as_deref())
    }

    fn redact_credentials(&mut self) {
        mask(&mut self.db_password);
        mask(&mut self.cluster_password);
    }
}

impl AuditFields for UpdateInfobaseRequest {
    fn audit_metadata(&self) -> AuditMetadata {
        AuditMetadata::new(
            &self.cluster_id,
            Some(&self.infobase_id),
            self.cluster_user.as_deref(),
        )
    }

    fn redact_credentials(&mut self) {
        mask(&mut self.db_password);
        mask(&mut self.cluster_password);
    }
}

impl AuditFields for DropInfobaseRequest {
    fn audit_metadata(&self) -> AuditMetadata {
        AuditMetadata::new(
            &self.cluster_id,
            Some(&self.infobase_id),
            self.cluster_user.as_deref(),
        )
    }

    fn redact_credentials(&mut self) {
        mask(&mut self.cluster_password);
    }
}

impl AuditFields for LockInfobaseRequest {
    fn audit_metadata(&self) -> AuditMetadata {
        AuditMetadata::new(
            &self.cluster_id,
            Some(&self.infobase_id),
            self.cluster_user.as_deref(),
        )
    }

    fn redact_credentials(&mut self) {
        mask(&mut self.cluster_password);
    }
}

impl AuditFields for UnlockInfobaseRequest {
    fn audit_metadata(&self) -> AuditMetadata {
        AuditMetadata::new(
            &self.cluster_id,
            Some(&self.infobase_id),
            self.cluster_user.as_deref(),
        )
    }

    fn redact_credentials(&mut self) {
        mask(&mut self.cluster_password);
    }
}

impl AuditFields for TerminateSessionRequest {
    fn audit_metadata(&self) -> AuditMetadata {
        AuditMetadata::new(&self.cluster_id, None, None)
    }

    fn redact_credentials(&mut self) {}
}

impl AuditFields for AuthenticateAgentRequest {
    fn audit_metadata(&self) -> AuditMetadata {
        AuditMetadata::new("", None, Some(&self.user))
    }

    fn redact_credentials(&mut self) {
        mask_present(&mut self.password);
    }
}

impl AuditFields for ClusterAuthenticateRequest {
    fn audit_metadata(&self) -> AuditMetadata {
        AuditMetadata::new(&self.cluster_id, None, Some(&self.user))
    }

    fn redact_credentials(&mut self) {
        mask_present(&mut self.password);
    }
}

impl AuditFields for AuthenticateInfobaseRequest {
    fn audit_metadata(&self) -> AuditMetadata {
        AuditMetadata::new(&self.cluster_id, None, Some(&self.user))
    }

    fn redact_credentials(&mut self) {
        mask_present(&mut self.password);
    }
}

impl AuditFields for GetClustersRequest {
    fn audit_metadata(&self) -> AuditMetadata {
        AuditMetadata::default()
    }

    fn redact_credentials(&mut self) {}
}

impl AuditFields for GetClusterInfoRequest {
    fn audit_metadata(&self) -> AuditMetadata {
        AuditMetadata::new(&self.cluster_id, None, None)
    }

    fn redact_credentials(&mut self) {}
}

impl AuditFields for GetSessionsRequest {
    fn audit_metadata(&self) -> AuditMetadata {
        AuditMetadata::new(&self.cluster_id, None, None)
    }

    fn redact_credentials(&mut self) {}
}

impl AuditFields for GetInfobasesShortRequest {
    fn audit_metadata(&self) -> AuditMetadata {
        AuditMetadata::new(&self.cluster_id, None, None)
    }

    fn redact_credentials(&mut self) {}
}

impl AuditFields for GetInfobaseSessionsRequest {
    fn audit_metadata(&self) -> AuditMetadata {
        AuditMetadata::new(&self.cluster_id, Some(&self.infobase_id), None)
    }

    fn redact_credentials(&mut self) {}
}
