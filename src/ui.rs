//! Interface de terminal — spinner durante o lote e resumo colorido no final.
//!
//! Usa as crates `indicatif` para o spinner de progresso e `console` para
//! estilização com cores.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::item::{Outcome, Status};
use crate::pipeline::BatchReport;
use crate::store::StoredMindMap;

/// Indicador visual de progresso para um lote em execução.
pub struct BatchProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    dim: Style,
}

impl BatchProgress {
    /// Inicia o spinner com o nome do arquivo de entrada.
    pub fn start(input_file: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} ({pos} settled, {elapsed})")
                .expect("invalid template"),
        );
        pb.set_message(format!("Generating mind maps from {input_file}"));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            dim: Style::new().dim(),
        }
    }

    /// Conta mais um item finalizado (sucesso ou falha).
    pub fn item_settled(&self) {
        self.pb.inc(1);
    }

    fn outcome_line(&self, outcome: &Outcome) -> String {
        match outcome.status {
            Status::Succeeded => format!("  {} {}", self.green.apply_to("✓"), outcome.topic),
            Status::Failed => format!("  {} {}", self.red.apply_to("✗"), outcome.topic),
        }
    }

    /// Finaliza o spinner e imprime uma linha por item, na ordem da entrada.
    pub fn complete(&self, report: &BatchReport) {
        self.pb.finish_and_clear();
        for outcome in &report.outcomes {
            println!("{}", self.outcome_line(outcome));
        }
        let summary = &report.summary;
        let failed = if summary.failed > 0 {
            self.red.apply_to(format!("{} failed", summary.failed))
        } else {
            self.dim.apply_to(format!("{} failed", summary.failed))
        };
        println!();
        println!(
            "{} succeeded, {failed} of {}",
            self.green.apply_to(summary.succeeded),
            summary.total
        );
        println!(
            "{}",
            self.dim
                .apply_to(format!("Report written to {}", report.report_path.display()))
        );
    }

    /// Limpa o spinner sem imprimir resumo (o lote falhou como um todo).
    pub fn abandon(&self) {
        self.pb.finish_and_clear();
    }
}

/// Imprime mapas armazenados: JSON completo ou uma linha por documento.
pub fn print_mind_maps(docs: &[StoredMindMap], json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(docs).unwrap_or_default());
        return;
    }
    let dim = Style::new().dim();
    if docs.is_empty() {
        println!("{}", dim.apply_to("No mind maps stored."));
        return;
    }
    for doc in docs {
        println!(
            "{}  {} / {}  {}",
            doc.id,
            doc.subject,
            doc.topic,
            dim.apply_to(format!(
                "{} subtopics, {}",
                doc.mind_map.sub_topics.len(),
                doc.generated_at.format("%Y-%m-%d %H:%M")
            ))
        );
    }
}
