//! Chain-data source abstraction
//!
//! The analyzer only talks to upstream through this trait, so the HTTP
//! explorer client and test doubles are interchangeable.

use async_trait::async_trait;

use crate::models::errors::AppResult;
use crate::models::types::{CodePresence, Transaction, TxCategory, WalletAddress};

#[async_trait]
pub trait ChainDataSource: Send + Sync + 'static {
    /// Transactions of one category for `address`, block ascending.
    /// An upstream "no results" answer is an empty Vec, not an error.
    async fn transactions(
        &self,
        category: TxCategory,
        address: &WalletAddress,
    ) -> AppResult<Vec<Transaction>>;

    /// Whether `address` currently holds bytecode. Never fails: any
    /// transport or shape problem is `CodePresence::Unknown`.
    async fn has_code(&self, address: &WalletAddress) -> CodePresence;

    async fn normal_transactions(&self, address: &WalletAddress) -> AppResult<Vec<Transaction>> {
        self.transactions(TxCategory::Normal, address).await
    }

    async fn token_transfers(&self, address: &WalletAddress) -> AppResult<Vec<Transaction>> {
        self.transactions(TxCategory::Token, address).await
    }

    async fn internal_transactions(&self, address: &WalletAddress) -> AppResult<Vec<Transaction>> {
        self.transactions(TxCategory::Internal, address).await
    }
}
