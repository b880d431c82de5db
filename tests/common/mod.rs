#![allow(dead_code)]

use sparrow_table::{Embedder, TableError};

/// Invoice exported with a split price header and a stray `%` column.
pub const SPLIT_HEADER_INVOICE: &str = "<table>\
    <thead><tr><th>Description</th><th>%</th><th>Qty</th><th colspan=\"2\">Price</th></tr></thead>\
    <thead><tr><th></th><th></th><th></th><th>Net</th><th>Gross</th></tr></thead>\
    <tbody>\
    <tr><td>Pen</td><td>(blue)</td><td>2</td><td>1.00</td><td>1.20</td></tr>\
    <tr><td>Book</td><td></td><td>1</td><td>9.00</td><td>9.90</td></tr>\
    </tbody></table>";

pub const BOND_HOLDINGS: &str = "<table>\
    <thead><tr><th>Instrument Name</th><th>Valuation</th><th>Currency</th></tr></thead>\
    <tbody>\
    <tr><td>Bond A</td><td>1,200</td><td>CHF</td></tr>\
    <tr><td>Bond B</td><td>980.50</td><td>EUR</td></tr>\
    </tbody></table>";

pub const VAT_SUMMARY: &str = "<table>\
    <thead><tr><th>VAT Rate</th><th>Amount</th></tr></thead>\
    <tbody><tr><td>23%</td><td>| 2.49 |</td></tr></tbody></table>";

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

/// One dimension per synonym group; a text scores 1 in every group one of
/// its words belongs to.
pub struct SynonymEmbedder {
    groups: Vec<Vec<&'static str>>,
}

impl SynonymEmbedder {
    pub fn new(groups: &[&[&'static str]]) -> Self {
        Self {
            groups: groups.iter().map(|group| group.to_vec()).collect(),
        }
    }
}

impl Embedder for SynonymEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, TableError> {
        Ok(texts
            .iter()
            .map(|text| {
                let lowered = text.to_lowercase();
                let words = lowered
                    .split(|ch: char| !ch.is_alphanumeric())
                    .filter(|word| !word.is_empty())
                    .collect::<Vec<_>>();
                self.groups
                    .iter()
                    .map(|group| {
                        if words.iter().any(|word| group.contains(word)) {
                            1.0
                        } else {
                            0.0
                        }
                    })
                    .collect()
            })
            .collect())
    }
}
