//! Per-message pipeline: extract, append, notify
//!
//! Each stage returns an explicit result and the orchestrator decides
//! to continue; a failed append still produces a confirmation attempt
//! so the sender is never left without a reply.

use chrono::Local;
use tracing::{error, info};

use gz_core::{ExtractedExpense, IncomingMessage, Kind, LedgerRow};

use crate::webhook::AppState;

/// Outcome of one pipeline run, for logging and the response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineReport {
    pub appended: bool,
    pub notified: bool,
}

/// Confirmation text sent back to the sender
pub fn confirmation_text(expense: &ExtractedExpense) -> String {
    let label = match expense.kind {
        Kind::Expense => "Gasto registrado",
        Kind::Income => "Receita registrada",
    };
    let value = format!("{:.2}", expense.amount).replace('.', ",");
    format!(
        "✅ {}!\n💰 Valor: R$ {}\n📂 Categoria: {}\n💳 Pagamento: {}",
        label, value, expense.category, expense.payment_method
    )
}

/// Run one inbound message through the whole pipeline.
///
/// Exactly one append attempt and one notification attempt per
/// message, regardless of how earlier stages fared.
pub async fn process_message(state: &AppState, message: &IncomingMessage) -> PipelineReport {
    let expense = state.extractor.extract(&message.text).await;
    info!(
        "Extracted {} {} in {:?}",
        expense.kind.as_str(),
        expense.amount,
        expense.category
    );

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let row = LedgerRow::new(&expense, &message.text, timestamp);

    let appended = match state.sheets.append_row(&row).await {
        Ok(()) => true,
        Err(e) => {
            error!("Ledger append failed: {}", e);
            false
        }
    };

    let delivered = state
        .notifier
        .notify(&message.sender, &confirmation_text(&expense))
        .await;

    PipelineReport {
        appended,
        notified: delivered.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_for_expense() {
        let expense = ExtractedExpense {
            amount: 50.0,
            category: "Alimentacao".to_string(),
            note: "Pizza".to_string(),
            payment_method: "Credito".to_string(),
            kind: Kind::Expense,
        };
        let text = confirmation_text(&expense);
        assert!(text.contains("Gasto registrado"));
        assert!(text.contains("R$ 50,00"));
        assert!(text.contains("Alimentacao"));
        assert!(text.contains("Credito"));
    }

    #[test]
    fn test_confirmation_for_income() {
        let expense = ExtractedExpense {
            amount: 1234.5,
            category: "Salario".to_string(),
            note: "Salário de maio".to_string(),
            payment_method: "Outros".to_string(),
            kind: Kind::Income,
        };
        let text = confirmation_text(&expense);
        assert!(text.contains("Receita registrada"));
        assert!(text.contains("R$ 1234,50"));
    }
}
