use crate::pipeline::{Notice, Report};
use crate::present::{DisplayRow, Page};
use std::io::{self, Write};

const DIVIDER: &str = "---";

pub fn render<W: Write>(report: &Report, w: &mut W) -> io::Result<()> {
    for notice in &report.notices {
        match notice {
            Notice::Info(m) => writeln!(w, "info: {}", m)?,
            Notice::Warning(m) => writeln!(w, "warning: {}", m)?,
        }
    }
    if let Some(page) = &report.page {
        if !report.notices.is_empty() {
            writeln!(w)?;
        }
        render_page(page, w)?;
    }
    Ok(())
}

pub fn render_page<W: Write>(page: &Page, w: &mut W) -> io::Result<()> {
    writeln!(w, "# {}", page.title)?;
    if let Some(subtitle) = &page.subtitle {
        writeln!(w, "_{}_", subtitle)?;
    }
    writeln!(w, "{}", DIVIDER)?;
    for row in &page.rows {
        render_row(row, w)?;
    }
    Ok(())
}

fn render_row<W: Write>(row: &DisplayRow, w: &mut W) -> io::Result<()> {
    writeln!(w)?;
    writeln!(w, "#### {}", row.name)?;
    writeln!(w, "![{}]({})", row.short_forecast, row.icon)?;
    writeln!(w, "**{}**{}", row.high_low, row.temperature_text())?;
    writeln!(w, "{}", row.detailed_forecast)?;
    writeln!(w, "{}", DIVIDER)
}
