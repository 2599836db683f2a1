// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! The proposal lifecycle state machine: the mandatory HITL gate between an
//! agent's intent to mutate the controller and the mutation actually
//! happening.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::ProposalKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Draft,
    Proposed,
    Approved,
    Rejected,
    Deployed,
    RolledBack,
    Archived,
}

impl ProposalStatus {
    fn name(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Proposed => "proposed",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Deployed => "deployed",
            Self::RolledBack => "rolled_back",
            Self::Archived => "archived",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProposalError {
    #[error("cannot {action} proposal in status {from}")]
    IllegalTransition { action: &'static str, from: &'static str },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub id: Uuid,
    pub conversation_id: Option<Uuid>,
    pub kind: ProposalKind,
    pub body: Value,
    pub status: ProposalStatus,
    pub external_automation_id: Option<String>,
    pub approver: Option<String>,
    pub rejection_reason: Option<String>,
    pub original_yaml: Option<String>,
    pub review_notes: Vec<String>,
    pub ha_disabled: Option<bool>,
    pub ha_error: Option<String>,

    pub created_at: DateTime<Utc>,
    pub proposed_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub deployed_at: Option<DateTime<Utc>>,
    pub rolled_back_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl Proposal {
    pub fn draft(kind: ProposalKind, body: Value, conversation_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            kind,
            body,
            status: ProposalStatus::Draft,
            external_automation_id: None,
            approver: None,
            rejection_reason: None,
            original_yaml: None,
            review_notes: Vec::new(),
            ha_disabled: None,
            ha_error: None,
            created_at: Utc::now(),
            proposed_at: None,
            approved_at: None,
            rejected_at: None,
            deployed_at: None,
            rolled_back_at: None,
            archived_at: None,
        }
    }

    fn expect(&self, allowed: &[ProposalStatus], action: &'static str) -> Result<(), ProposalError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(ProposalError::IllegalTransition { action, from: self.status.name() })
        }
    }

    pub fn propose(&mut self) -> Result<(), ProposalError> {
        self.expect(&[ProposalStatus::Draft], "propose")?;
        self.status = ProposalStatus::Proposed;
        self.proposed_at = Some(Utc::now());
        Ok(())
    }

    pub fn approve(&mut self, by: impl Into<String>) -> Result<(), ProposalError> {
        self.expect(&[ProposalStatus::Proposed], "approve")?;
        self.status = ProposalStatus::Approved;
        self.approver = Some(by.into());
        self.approved_at = Some(Utc::now());
        Ok(())
    }

    /// Proposed -> Rejected, or a late Approved -> Rejected.
    pub fn reject(&mut self, reason: impl Into<String>) -> Result<(), ProposalError> {
        self.expect(&[ProposalStatus::Proposed, ProposalStatus::Approved], "reject")?;
        self.status = ProposalStatus::Rejected;
        self.rejection_reason = Some(reason.into());
        self.rejected_at = Some(Utc::now());
        Ok(())
    }

    pub fn deploy(&mut self, external_id: impl Into<String>) -> Result<(), ProposalError> {
        self.expect(&[ProposalStatus::Approved], "deploy")?;
        self.status = ProposalStatus::Deployed;
        self.external_automation_id = Some(external_id.into());
        self.deployed_at = Some(Utc::now());
        Ok(())
    }

    /// Best-effort rollback: always transitions regardless of whether the
    /// controller actually disabled the artefact. `ha_disabled` records
    /// whether that attempt succeeded so the caller can distinguish a clean
    /// rollback from a dangling artefact — never let controller flakiness
    /// block the state transition itself.
    pub fn rollback(&mut self, ha_disabled: bool, ha_error: Option<String>) -> Result<(), ProposalError> {
        self.expect(&[ProposalStatus::Deployed], "rollback")?;
        self.status = ProposalStatus::RolledBack;
        self.ha_disabled = Some(ha_disabled);
        self.ha_error = ha_error;
        self.rolled_back_at = Some(Utc::now());
        Ok(())
    }

    pub fn archive(&mut self) -> Result<(), ProposalError> {
        self.expect(&[ProposalStatus::Rejected, ProposalStatus::RolledBack], "archive")?;
        self.status = ProposalStatus::Archived;
        self.archived_at = Some(Utc::now());
        Ok(())
    }

    pub fn can_transition_to(&self, to: ProposalStatus) -> bool {
        use ProposalStatus::*;
        matches!(
            (self.status, to),
            (Draft, Proposed)
                | (Proposed, Approved)
                | (Proposed, Rejected)
                | (Approved, Rejected)
                | (Approved, Deployed)
                | (Deployed, RolledBack)
                | (Rejected, Archived)
                | (RolledBack, Archived)
        )
    }

    pub fn is_terminal(&self) -> bool {
        self.status == ProposalStatus::Archived
    }
}
