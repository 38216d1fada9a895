use std::io::Write;

use anyhow::{Context, Result};
use tabwriter::TabWriter;

/// 表示用の表。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// ヘッダーだけを持つ空の表を返す。
    pub fn new<S: Into<String>>(header: impl IntoIterator<Item = S>) -> Self {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

/// Consoleに表を表示するためのtrait。
pub trait ConsolePresenter {
    /// 表を表示する。
    ///
    /// # Arguments
    ///
    /// * `table` - 表示する表
    fn show_table(&mut self, table: &Table) -> Result<()>;
}

/// 列を揃えたテキストで表を表示する。
pub struct ConsoleTable<'a, W: Write> {
    writer: &'a mut W,
}

impl<'a, W: Write> ConsoleTable<'a, W> {
    /// 新しい`ConsoleTable`を返す。
    pub fn new(writer: &'a mut W) -> Self {
        Self { writer }
    }
}

impl<'a, W: Write> ConsolePresenter for ConsoleTable<'a, W> {
    // ヘッダー、区切り線、各行の順に出力する。
    fn show_table(&mut self, table: &Table) -> Result<()> {
        let mut tw = TabWriter::new(Vec::new());

        writeln!(tw, "{}", table.header.join("\t")).context("Failed to write table header")?;
        let rule = table
            .header
            .iter()
            .map(|column| "-".repeat(column.chars().count()))
            .collect::<Vec<_>>();
        writeln!(tw, "{}", rule.join("\t")).context("Failed to write table rule")?;
        for row in &table.rows {
            let cells = row.iter().map(|cell| sanitize(cell)).collect::<Vec<_>>();
            writeln!(tw, "{}", cells.join("\t"))
                .with_context(|| format!("Failed to write row: {:?}", row))?;
        }

        let output = tw.into_inner().context("Failed to align table")?;
        self.writer
            .write_all(&output)
            .context("Failed to write table")?;

        Ok(())
    }
}

/// 列や行が崩れないように、タブと改行を空白に置き換える。
fn sanitize(cell: &str) -> String {
    cell.replace(['\t', '\r', '\n'], " ")
}
