//! The workflow orchestrator.
//!
//! Every externally visible operation lives here. The pattern throughout:
//! load the affected vouchers, validate and stage the change through the
//! pure core services, then persist via the store's conditional write —
//! batched and atomic whenever more than one record moves. A version
//! conflict surfaces as a retryable `ConcurrentModification`; a stale
//! write is never applied silently.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;

use cartage_core::liquidation::error::LiquidationError;
use cartage_core::liquidation::service::LiquidationService;
use cartage_core::liquidation::types::{ExpenseEntry, LiquidationSummary};
use cartage_core::numbering::format::NumberKind;
use cartage_core::reconciliation::error::ReconciliationError;
use cartage_core::reconciliation::service::ReconciliationService;
use cartage_core::voucher::types::{
    BillingDetail, CollectionDetail, TransactionType, Voucher, VoucherKind, VoucherStatus,
};
use cartage_core::voucher::validation::validate_new_voucher;
use cartage_core::workflow::policy::ApprovalPolicy;
use cartage_core::workflow::service::WorkflowService;
use cartage_shared::config::EngineConfig;
use cartage_shared::types::{Actor, VoucherId};
use cartage_store::error::StoreError;
use cartage_store::store::VoucherStore;

use crate::error::{EngineError, EngineResult};
use crate::ledger::GeneralLedger;
use crate::numbering::NumberingService;
use crate::types::{AutoApproveResult, CreateVoucherInput, FinalizeResult, StatementResult};

/// The entry point other systems call.
///
/// Composes the numbering service, approval state machine, reconciliation
/// engine, and liquidation engine over a [`VoucherStore`]. The orchestrator
/// is the only component with write coordination responsibility; the
/// composed services are pure functions over voucher records.
pub struct Orchestrator<S, L> {
    store: Arc<S>,
    ledger: Arc<L>,
    policy: ApprovalPolicy,
    config: EngineConfig,
    numbering: NumberingService<S>,
}

impl<S: VoucherStore, L: GeneralLedger> Orchestrator<S, L> {
    /// Creates an orchestrator with the default approval policy and
    /// configuration.
    pub fn new(store: Arc<S>, ledger: Arc<L>) -> Self {
        Self::with_config(
            store,
            ledger,
            ApprovalPolicy::default_policy(),
            EngineConfig::default(),
        )
    }

    /// Creates an orchestrator with an explicit policy and configuration.
    pub fn with_config(
        store: Arc<S>,
        ledger: Arc<L>,
        policy: ApprovalPolicy,
        config: EngineConfig,
    ) -> Self {
        let numbering = NumberingService::new(Arc::clone(&store), config.numbering.clone());
        Self {
            store,
            ledger,
            policy,
            config,
            numbering,
        }
    }

    // ========================================================================
    // Voucher lifecycle
    // ========================================================================

    /// Creates a voucher in Draft.
    pub async fn create_voucher(
        &self,
        input: CreateVoucherInput,
        actor: &Actor,
    ) -> EngineResult<Voucher> {
        let mut voucher = Self::build_draft(input, actor)?;
        validate_new_voucher(&voucher)?;
        self.assign_number(&mut voucher).await?;

        let stored = self.store.insert(voucher).await?;
        tracing::info!(
            voucher_id = %stored.id,
            voucher_number = %stored.voucher_number,
            transaction_type = %stored.transaction_type(),
            "voucher created"
        );
        Ok(stored)
    }

    /// Submits a draft voucher for approval.
    pub async fn submit(&self, voucher_id: VoucherId, actor: &Actor) -> EngineResult<Voucher> {
        let voucher = self.store.get(voucher_id).await?;
        let expected_version = voucher.version;

        let action = WorkflowService::submit(&voucher, actor)?;
        let mut updated = voucher;
        WorkflowService::apply(&mut updated, action);

        let stored = self.store.update(updated, expected_version).await?;
        tracing::info!(voucher_id = %voucher_id, "voucher submitted");
        Ok(stored)
    }

    /// Signs one approval on a pending voucher.
    pub async fn approve(
        &self,
        voucher_id: VoucherId,
        actor: &Actor,
        remarks: Option<String>,
    ) -> EngineResult<Voucher> {
        let voucher = self.store.get(voucher_id).await?;
        let expected_version = voucher.version;

        let action = WorkflowService::approve(&voucher, actor, &self.policy, remarks)?;
        let mut updated = voucher;
        WorkflowService::apply(&mut updated, action);

        let stored = self.store.update(updated, expected_version).await?;
        tracing::info!(
            voucher_id = %voucher_id,
            status = %stored.status,
            "voucher approval signed"
        );
        Ok(stored)
    }

    /// Rejects a pending voucher. The reason is required.
    pub async fn reject(
        &self,
        voucher_id: VoucherId,
        actor: &Actor,
        reason: String,
    ) -> EngineResult<Voucher> {
        let voucher = self.store.get(voucher_id).await?;
        let expected_version = voucher.version;

        let action = WorkflowService::reject(&voucher, actor, &self.policy, reason)?;
        let mut updated = voucher;
        WorkflowService::apply(&mut updated, action);

        let stored = self.store.update(updated, expected_version).await?;
        tracing::info!(voucher_id = %voucher_id, "voucher rejected");
        Ok(stored)
    }

    /// Creates, approves, and posts a voucher in one atomic step.
    ///
    /// The record is first persisted already Posted, with the actor as the
    /// sole approver; no Pending state is ever observable.
    pub async fn auto_approve(
        &self,
        input: CreateVoucherInput,
        actor: &Actor,
    ) -> EngineResult<AutoApproveResult> {
        let mut voucher = Self::build_draft(input, actor)?;
        validate_new_voucher(&voucher)?;

        let action = WorkflowService::auto_approve(&voucher, actor, &self.policy, None)?;
        WorkflowService::apply(&mut voucher, action);

        self.assign_number(&mut voucher).await?;
        let stored = self.store.insert(voucher).await?;

        tracing::info!(
            voucher_id = %stored.id,
            voucher_number = %stored.voucher_number,
            "voucher auto-approved"
        );

        let posted_expense_id =
            (stored.transaction_type() == TransactionType::Expense).then_some(stored.id);
        Ok(AutoApproveResult {
            voucher: stored,
            posted_expense_id,
        })
    }

    /// Cancels a draft or pending voucher.
    pub async fn cancel(
        &self,
        voucher_id: VoucherId,
        actor: &Actor,
        remarks: Option<String>,
    ) -> EngineResult<Voucher> {
        let voucher = self.store.get(voucher_id).await?;
        let expected_version = voucher.version;

        let action = WorkflowService::cancel(&voucher, actor, remarks)?;
        let mut updated = voucher;
        WorkflowService::apply(&mut updated, action);

        let stored = self.store.update(updated, expected_version).await?;
        tracing::info!(voucher_id = %voucher_id, "voucher cancelled");
        Ok(stored)
    }

    // ========================================================================
    // Reconciliation
    // ========================================================================

    /// Groups billing vouchers into a new statement of account.
    ///
    /// All-or-nothing: every id must be an unclaimed Draft billing, and the
    /// members are claimed through one atomic conditional batch write. A
    /// concurrent claim of any member fails the whole call and leaves the
    /// store untouched.
    pub async fn generate_statement(
        &self,
        voucher_ids: &[VoucherId],
        actor: &Actor,
    ) -> EngineResult<StatementResult> {
        if voucher_ids.is_empty() {
            return Err(ReconciliationError::EmptyStatement.into());
        }

        let distinct: HashSet<VoucherId> = voucher_ids.iter().copied().collect();
        if distinct.len() != voucher_ids.len() {
            return Err(EngineError::Validation(
                "duplicate voucher id in statement request".to_string(),
            ));
        }

        let mut members = Vec::with_capacity(voucher_ids.len());
        for id in voucher_ids {
            let voucher = self.store.get(*id).await?;
            ReconciliationService::check_statement_eligibility(&voucher)?;
            members.push(voucher);
        }

        let reference = self
            .numbering
            .next(NumberKind::Statement, Utc::now().date_naive())
            .await?;

        let mut updates = Vec::with_capacity(members.len());
        for mut member in members {
            let expected_version = member.version;
            ReconciliationService::claim_for_statement(&mut member, &reference, actor)?;
            updates.push((member, expected_version));
        }

        let members = self.store.update_batch(updates).await?;
        tracing::info!(
            statement_reference = %reference,
            member_count = members.len(),
            "statement generated"
        );

        Ok(StatementResult {
            statement_reference: reference,
            members,
        })
    }

    /// Applies a collection's allocations against its linked billings.
    ///
    /// Entries are processed in array order against each billing's running
    /// balance; all succeed or nothing is written. A collection allocates
    /// exactly once.
    pub async fn allocate_collection(&self, collection_id: VoucherId) -> EngineResult<Voucher> {
        let collection = self.store.get(collection_id).await?;
        let detail = collection.collection().ok_or(ReconciliationError::TypeMismatch {
            voucher_id: collection_id,
            expected: TransactionType::Collection,
            actual: collection.transaction_type(),
        })?;

        if detail.allocated_at.is_some() {
            return Err(ReconciliationError::AlreadyAllocated { collection_id }.into());
        }

        let links = detail.linked_billings.clone();
        let tolerance = self.config.reconciliation.settlement_tolerance;

        // Stage billings by id so repeated links against the same billing
        // run against its running balance, not the stored one.
        let mut touch_order: Vec<VoucherId> = Vec::new();
        let mut staged: HashMap<VoucherId, (Voucher, u64)> = HashMap::new();

        for link in &links {
            if !staged.contains_key(&link.billing_id) {
                let billing = match self.store.get(link.billing_id).await {
                    Ok(billing) => billing,
                    Err(StoreError::NotFound(id)) => {
                        return Err(ReconciliationError::NotFound(id).into());
                    }
                    Err(other) => return Err(other.into()),
                };
                touch_order.push(link.billing_id);
                let expected_version = billing.version;
                staged.insert(link.billing_id, (billing, expected_version));
            }

            if let Some((billing, _)) = staged.get_mut(&link.billing_id) {
                ReconciliationService::apply_allocation(billing, link.amount, tolerance)?;
            }
        }

        let expected_collection_version = collection.version;
        let mut collection = collection;
        let now = Utc::now();
        if let Some(detail) = collection.collection_mut() {
            detail.allocated_at = Some(now);
        }
        collection.updated_at = now;

        let mut updates: Vec<(Voucher, u64)> = touch_order
            .into_iter()
            .filter_map(|id| staged.remove(&id))
            .collect();
        updates.push((collection, expected_collection_version));

        let mut results = self.store.update_batch(updates).await?;
        let collection = results
            .pop()
            .ok_or_else(|| EngineError::Store("empty batch result".to_string()))?;

        tracing::info!(
            collection_id = %collection_id,
            allocations = links.len(),
            "collection allocated"
        );
        Ok(collection)
    }

    /// Finalizes a statement to the general ledger.
    ///
    /// Terminal and irreversible: members are flagged posted-to-ledger,
    /// still-pending members move to Posted, and the ledger collaborator
    /// is invoked exactly once. Re-finalizing fails `AlreadyPosted` without
    /// touching member state.
    pub async fn finalize_statement(
        &self,
        statement_reference: &str,
        actor: &Actor,
    ) -> EngineResult<FinalizeResult> {
        let members = self.store.find_by_statement(statement_reference).await?;
        ReconciliationService::check_finalizable(&members, statement_reference)?;

        let mut updates = Vec::with_capacity(members.len());
        for mut member in members {
            let expected_version = member.version;
            ReconciliationService::finalize_member(&mut member, actor)?;
            updates.push((member, expected_version));
        }

        let members = self.store.update_batch(updates).await?;
        self.ledger.post_statement(statement_reference, &members).await;

        tracing::info!(
            statement_reference,
            member_count = members.len(),
            "statement finalized to ledger"
        );
        Ok(FinalizeResult {
            statement_reference: statement_reference.to_string(),
            posted: true,
        })
    }

    // ========================================================================
    // Liquidation
    // ========================================================================

    /// Creates Draft expense vouchers liquidating a posted advance.
    ///
    /// Each expense then runs through the ordinary approval lifecycle
    /// independently; liquidation does not bypass approval.
    pub async fn liquidate(
        &self,
        parent_id: VoucherId,
        entries: Vec<ExpenseEntry>,
        actor: &Actor,
    ) -> EngineResult<Vec<Voucher>> {
        let parent = self.load_parent(parent_id).await?;
        LiquidationService::validate_parent(&parent)?;
        LiquidationService::validate_entries(&entries)?;

        let mut created = Vec::with_capacity(entries.len());
        for entry in entries {
            let now = Utc::now();
            let mut voucher = Voucher {
                id: VoucherId::new(),
                voucher_number: String::new(),
                source_module: "liquidation".to_string(),
                amount: entry.amount,
                currency: parent.currency,
                requestor_id: actor.id,
                requestor_name: actor.name.clone(),
                vendor_name: entry.vendor_name,
                customer_id: None,
                customer_name: None,
                project_number: entry.project_number,
                purpose: entry.purpose,
                status: VoucherStatus::Draft,
                approvers: vec![],
                workflow_history: vec![],
                kind: VoucherKind::Expense {
                    parent_voucher_id: Some(parent_id),
                },
                version: 0,
                created_at: now,
                updated_at: now,
            };
            self.assign_number(&mut voucher).await?;
            created.push(self.store.insert(voucher).await?);
        }

        tracing::info!(
            parent_id = %parent_id,
            expense_count = created.len(),
            "liquidation expenses created"
        );
        Ok(created)
    }

    /// Derives the current liquidation usage of a posted advance.
    pub async fn liquidation_summary(
        &self,
        parent_id: VoucherId,
    ) -> EngineResult<LiquidationSummary> {
        let parent = self.load_parent(parent_id).await?;
        LiquidationService::validate_parent(&parent)?;

        let expenses = self.store.find_by_parent(parent_id).await?;
        Ok(LiquidationService::summarize(&parent, &expenses))
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Loads a voucher by id.
    pub async fn voucher(&self, voucher_id: VoucherId) -> EngineResult<Voucher> {
        Ok(self.store.get(voucher_id).await?)
    }

    /// Lists vouchers of a transaction type, in creation order.
    pub async fn vouchers_by_type(
        &self,
        transaction_type: TransactionType,
    ) -> EngineResult<Vec<Voucher>> {
        Ok(self.store.find_by_type(transaction_type).await?)
    }

    /// Loads the members of a statement.
    pub async fn statement_members(
        &self,
        statement_reference: &str,
    ) -> EngineResult<Vec<Voucher>> {
        let members = self.store.find_by_statement(statement_reference).await?;
        if members.is_empty() {
            return Err(ReconciliationError::StatementNotFound {
                statement_reference: statement_reference.to_string(),
            }
            .into());
        }
        Ok(members)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn load_parent(&self, parent_id: VoucherId) -> EngineResult<Voucher> {
        match self.store.get(parent_id).await {
            Ok(parent) => Ok(parent),
            Err(StoreError::NotFound(_)) => {
                Err(LiquidationError::ParentNotFound(parent_id).into())
            }
            Err(other) => Err(other.into()),
        }
    }

    async fn assign_number(&self, voucher: &mut Voucher) -> EngineResult<()> {
        let number = self
            .numbering
            .next(
                NumberKind::Voucher(voucher.transaction_type()),
                Utc::now().date_naive(),
            )
            .await?;
        voucher.voucher_number = number;
        Ok(())
    }

    fn build_draft(input: CreateVoucherInput, actor: &Actor) -> EngineResult<Voucher> {
        if !input.linked_billings.is_empty()
            && input.transaction_type != TransactionType::Collection
        {
            return Err(EngineError::Validation(format!(
                "linked billings do not apply to {} vouchers",
                input.transaction_type
            )));
        }

        let kind = match input.transaction_type {
            TransactionType::Expense => VoucherKind::Expense {
                parent_voucher_id: None,
            },
            TransactionType::BudgetRequest => VoucherKind::BudgetRequest,
            TransactionType::CashAdvance => VoucherKind::CashAdvance,
            TransactionType::Billing => {
                VoucherKind::Billing(BillingDetail::unbilled(input.amount))
            }
            TransactionType::Collection => {
                VoucherKind::Collection(CollectionDetail::new(input.linked_billings))
            }
            TransactionType::Adjustment => VoucherKind::Adjustment,
            TransactionType::Reimbursement => VoucherKind::Reimbursement,
        };

        let now = Utc::now();
        Ok(Voucher {
            id: VoucherId::new(),
            voucher_number: String::new(),
            source_module: input.source_module,
            amount: input.amount,
            currency: input.currency,
            requestor_id: actor.id,
            requestor_name: actor.name.clone(),
            vendor_name: input.vendor_name,
            customer_id: input.customer_id,
            customer_name: input.customer_name,
            project_number: input.project_number,
            purpose: input.purpose,
            status: VoucherStatus::Draft,
            approvers: vec![],
            workflow_history: vec![],
            kind,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }
}
