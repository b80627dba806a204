//! Core types for the credit ledger
//!
//! All types are designed for:
//! - Stable JSON representation (serde)
//! - Exact arithmetic (Decimal for money and hectares, u64 for credits)
//! - Time-ordered identifiers (UUIDv7)

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Organization identifier (NGO or corporate buyer)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationId(String);

impl OrganizationId {
    /// Create new organization ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OrganizationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Project identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(Uuid);

impl ProjectId {
    /// Fresh time-ordered ID
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ProjectId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Fresh time-ordered ID
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for TransactionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Verification status of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Created, not yet submitted
    Draft,
    /// Awaiting a verification decision
    PendingVerification,
    /// Verified, credits issued (terminal)
    Verified,
    /// Rejected, may be resubmitted
    Rejected,
}

impl ProjectStatus {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Draft => "Draft",
            ProjectStatus::PendingVerification => "Pending Verification",
            ProjectStatus::Verified => "Verified",
            ProjectStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Data an NGO supplies when uploading a restoration project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    /// Owning NGO
    pub owner: OrganizationId,
    /// Project name
    pub name: String,
    /// Human-readable location
    pub location: String,
    /// Declared restoration area
    pub hectares: Decimal,
    /// Date the project data was uploaded
    pub upload_date: NaiveDate,
    /// Communities served by the project
    #[serde(default)]
    pub communities: u32,
}

/// Blue carbon restoration project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Project ID
    pub id: ProjectId,
    /// Owning NGO
    pub owner: OrganizationId,
    /// Project name
    pub name: String,
    /// Human-readable location
    pub location: String,
    /// Declared restoration area
    pub hectares: Decimal,
    /// Communities served
    pub communities: u32,
    /// Upload date
    pub upload_date: NaiveDate,
    /// Verification status
    pub status: ProjectStatus,
    /// Credits minted on verification (zero unless verified)
    pub issued_credits: u64,
    /// Hectares accepted by the verifier
    pub verified_hectares: Option<Decimal>,
    /// Reason given on the latest rejection
    pub rejection_reason: Option<String>,
    /// Credits sold against this project
    pub credits_sold: u64,
    /// Gross sale proceeds attributed to this project
    pub revenue: Decimal,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Build a draft project from upload data
    pub fn draft(id: ProjectId, data: NewProject, now: DateTime<Utc>) -> Self {
        Self {
            id,
            owner: data.owner,
            name: data.name,
            location: data.location,
            hectares: data.hectares,
            communities: data.communities,
            upload_date: data.upload_date,
            status: ProjectStatus::Draft,
            issued_credits: 0,
            verified_hectares: None,
            rejection_reason: None,
            credits_sold: 0,
            revenue: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// `issued_credits > 0` exactly when the project is verified
    pub fn is_consistent(&self) -> bool {
        (self.issued_credits > 0) == (self.status == ProjectStatus::Verified)
    }
}

/// Credit balance of one organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditBalance {
    /// Organization
    pub organization_id: OrganizationId,
    /// Credits that can be sold or retired
    pub available: u64,
    /// Credits permanently retired
    pub retired: u64,
    /// Credits ever minted to or purchased by the organization
    pub received: u64,
}

impl CreditBalance {
    /// Zero balance for an organization with no credit history
    pub fn empty(organization_id: OrganizationId) -> Self {
        Self {
            organization_id,
            available: 0,
            retired: 0,
            received: 0,
        }
    }

    /// Available plus retired
    pub fn owned(&self) -> u64 {
        self.available + self.retired
    }
}

/// Completed credit purchase (append-only ledger entry)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID
    pub id: TransactionId,
    /// Project the credits were sold against
    pub project_id: ProjectId,
    /// Corporate buyer
    pub buyer_id: OrganizationId,
    /// Selling NGO
    pub seller_id: OrganizationId,
    /// Credits moved
    pub credit_amount: u64,
    /// Price per credit
    pub unit_price: Decimal,
    /// Completion time
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// credit_amount × unit_price
    pub fn total_value(&self) -> Decimal {
        Decimal::from(self.credit_amount) * self.unit_price
    }

    /// Whether the organization took part as buyer or seller
    pub fn involves(&self, organization: &OrganizationId) -> bool {
        &self.buyer_id == organization || &self.seller_id == organization
    }
}

/// Revenue split bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueBucket {
    /// Community share
    Community,
    /// NGO operations
    Operations,
    /// Verification costs
    Verification,
    /// Platform fee
    Platform,
}

/// Sale proceeds split across the four buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RevenueAllocation {
    /// Community share
    pub community: Decimal,
    /// NGO operations
    pub operations: Decimal,
    /// Verification costs
    pub verification: Decimal,
    /// Platform fee
    pub platform: Decimal,
}

impl RevenueAllocation {
    /// Sum of all buckets
    pub fn total(&self) -> Decimal {
        self.community + self.operations + self.verification + self.platform
    }

    /// Amount in one bucket
    pub fn get(&self, bucket: RevenueBucket) -> Decimal {
        match bucket {
            RevenueBucket::Community => self.community,
            RevenueBucket::Operations => self.operations,
            RevenueBucket::Verification => self.verification,
            RevenueBucket::Platform => self.platform,
        }
    }

    /// Bucket name → amount
    pub fn to_map(&self) -> BTreeMap<RevenueBucket, Decimal> {
        [
            RevenueBucket::Community,
            RevenueBucket::Operations,
            RevenueBucket::Verification,
            RevenueBucket::Platform,
        ]
        .into_iter()
        .map(|bucket| (bucket, self.get(bucket)))
        .collect()
    }
}

/// Running revenue totals of a selling organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueLedger {
    /// Seller
    pub organization_id: OrganizationId,
    /// Accumulated per-bucket amounts
    pub totals: RevenueAllocation,
    /// Gross sale proceeds
    pub gross: Decimal,
    /// Number of sales recorded
    pub sales: u64,
}

impl RevenueLedger {
    /// Empty ledger
    pub fn empty(organization_id: OrganizationId) -> Self {
        Self {
            organization_id,
            totals: RevenueAllocation::default(),
            gross: Decimal::ZERO,
            sales: 0,
        }
    }

    /// Add one sale's allocation
    ///
    /// Leaves the ledger untouched and returns `InvalidAmount` if any running
    /// total would leave the decimal range.
    pub fn record(&mut self, allocation: &RevenueAllocation) -> Result<()> {
        let add = |current: Decimal, amount: Decimal| {
            current.checked_add(amount).ok_or_else(|| {
                Error::InvalidAmount(format!(
                    "revenue of {} is out of range ({} + {})",
                    self.organization_id, current, amount
                ))
            })
        };

        let totals = RevenueAllocation {
            community: add(self.totals.community, allocation.community)?,
            operations: add(self.totals.operations, allocation.operations)?,
            verification: add(self.totals.verification, allocation.verification)?,
            platform: add(self.totals.platform, allocation.platform)?,
        };
        let gross = add(self.gross, allocation.total())?;

        self.totals = totals;
        self.gross = gross;
        self.sales = self.sales.saturating_add(1);
        Ok(())
    }
}

/// Credit movement recorded in the audit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CreditMovement {
    /// New credits issued to an organization
    Minted {
        /// Receiving organization
        organization: OrganizationId,
        /// Verified project that triggered issuance, if any
        project: Option<ProjectId>,
        /// Credits issued
        amount: u64,
    },
    /// Available credits moved between organizations
    Transferred {
        /// Debited organization
        from: OrganizationId,
        /// Credited organization
        to: OrganizationId,
        /// Credits moved
        amount: u64,
        /// Purchase that caused the move, if any
        transaction: Option<TransactionId>,
    },
    /// Credits moved from available to retired
    Retired {
        /// Retiring organization
        organization: OrganizationId,
        /// Credits retired
        amount: u64,
    },
}

/// Audit log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditEvent {
    /// Position in the log (starting at 0)
    pub sequence: u64,
    /// Commit time
    pub timestamp: DateTime<Utc>,
    /// What happened
    pub movement: CreditMovement,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transaction_total_value() {
        let tx = Transaction {
            id: TransactionId::new(),
            project_id: ProjectId::new(),
            buyer_id: OrganizationId::new("corp-b"),
            seller_id: OrganizationId::new("ngo-a"),
            credit_amount: 500,
            unit_price: dec!(20),
            timestamp: Utc::now(),
        };
        assert_eq!(tx.total_value(), dec!(10000));
        assert!(tx.involves(&OrganizationId::new("corp-b")));
        assert!(!tx.involves(&OrganizationId::new("corp-c")));
    }

    #[test]
    fn test_project_consistency() {
        let data = NewProject {
            owner: OrganizationId::new("ngo-a"),
            name: "Mangrove Restoration - Sundarbans".to_string(),
            location: "West Bengal, India".to_string(),
            hectares: dec!(120),
            upload_date: NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
            communities: 8,
        };
        let mut project = Project::draft(ProjectId::new(), data, Utc::now());
        assert!(project.is_consistent());

        project.issued_credits = 2400;
        assert!(!project.is_consistent());

        project.status = ProjectStatus::Verified;
        assert!(project.is_consistent());
    }

    #[test]
    fn test_revenue_ledger_record() {
        let mut ledger = RevenueLedger::empty(OrganizationId::new("ngo-a"));
        let allocation = RevenueAllocation {
            community: dec!(6000),
            operations: dec!(2500),
            verification: dec!(1000),
            platform: dec!(500),
        };
        ledger.record(&allocation).unwrap();
        ledger.record(&allocation).unwrap();

        assert_eq!(ledger.gross, dec!(20000));
        assert_eq!(ledger.totals.community, dec!(12000));
        assert_eq!(ledger.sales, 2);
        assert_eq!(allocation.to_map()[&RevenueBucket::Platform], dec!(500));
    }

    #[test]
    fn test_revenue_ledger_overflow_leaves_totals_unchanged() {
        let mut ledger = RevenueLedger::empty(OrganizationId::new("ngo-a"));
        let large = RevenueAllocation {
            community: Decimal::MAX - dec!(10),
            ..RevenueAllocation::default()
        };
        ledger.record(&large).unwrap();
        let before = ledger.clone();

        let err = ledger.record(&large).unwrap_err();
        assert!(matches!(err, Error::InvalidAmount(_)));
        assert_eq!(ledger, before);
        assert_eq!(ledger.sales, 1);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ProjectStatus::PendingVerification).unwrap();
        assert_eq!(json, "\"pending_verification\"");
        assert_eq!(ProjectStatus::PendingVerification.to_string(), "Pending Verification");
    }
}
