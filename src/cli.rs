//! Interface de linha de comando baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (generate, list, serve)
//! e flags globais (--concurrency, --model, --verbose).

use clap::{Parser, Subcommand};

/// Gera mapas mentais em lote a partir de um CSV de assuntos e tópicos.
#[derive(Debug, Parser)]
#[command(name = "mindmap-gen", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Máximo de gerações simultâneas (sobrepõe o arquivo e o ambiente).
    #[arg(long, short = 'c', global = true)]
    pub concurrency: Option<usize>,

    /// Identificador do modelo a usar nesta execução.
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generates one mind map per row of an input CSV and writes a status report.
    Generate {
        /// CSV file name, resolved against `input_dir`.
        file: String,
    },

    /// Lists stored mind maps.
    List {
        #[arg(long)]
        subject: Option<String>,

        #[arg(long)]
        topic: Option<String>,

        /// Print the full documents as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Starts the HTTP server.
    Serve {
        /// Port to listen on (overrides `port` and `PORT`).
        #[arg(long)]
        port: Option<u16>,
    },
}
