use crate::core::ScheduleResult;

const HEADERS: [&str; 11] = [
    "Month",
    "Available",
    "Principal",
    "Interest",
    "Extra",
    "Balance",
    "Months left",
    "Int. saved",
    "Invested",
    "Inv. interest",
    "Inv. value",
];

/// Fixed 2-decimal text rendering of a schedule and its summary.
pub fn render_table(result: &ScheduleResult) -> String {
    let rows: Vec<[String; 11]> = result
        .monthly_data
        .iter()
        .map(|m| {
            [
                m.month.to_string(),
                money(m.available_total),
                money(m.loan_principal),
                money(m.loan_interest),
                money(m.loan_additional),
                money(m.loan_new_total),
                m.loan_new_duration.to_string(),
                money(m.loan_saved),
                money(m.invest_add),
                money(m.invest_interest),
                money(m.invest_new_total),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS, &widths);
    let rule_len = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
    out.push_str(&"-".repeat(rule_len));
    out.push('\n');
    for row in &rows {
        push_row(&mut out, row, &widths);
    }

    out.push('\n');
    let payoff = result
        .payoff_month()
        .map_or_else(|| "-".to_string(), |month| month.to_string());
    let summary = format!(
        "Monthly installment:        {}\n\
         Total without prepayment:   {}\n\
         Total with prepayment:      {} ({}%)\n\
         Loan repaid in month:       {payoff}\n\
         Investment without prepay:  {}\n\
         Investment with prepay:     {} ({}%)\n",
        money(result.loan_monthly),
        money(result.total_loan_expected),
        money(result.total_loan_paid),
        money(result.loan_saved_percent()),
        money(result.invest_max),
        money(result.invest_result),
        money(result.invest_delta_percent()),
    );
    out.push_str(&summary);
    out
}

fn money(value: f64) -> String {
    // Avoid printing "-0.00" for tiny negative residue.
    if value.abs() < 0.005 {
        return "0.00".to_string();
    }
    format!("{value:.2}")
}

fn push_row<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:>width$}", cell.as_ref(), width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(&line);
    out.push('\n');
}
