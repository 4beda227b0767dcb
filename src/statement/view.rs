//! HTML rendering for the ledger statement page.

use maud::{Markup, html};
use time::{Date, Month};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CREDIT_BADGE_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE,
        FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, PAYMENT_BADGE_STYLE,
        SUMMARY_CARD_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency,
    },
    navigation::NavBar,
    pagination::PageIndicator,
    statement::aggregate::StatementSummary,
};

use super::{
    classify::EntryKind,
    criteria::KindFilter,
    ledger_page::{LedgerQueryParams, LedgerRow},
};

/// The max number of graphemes to display for a note before truncating and
/// displaying ellipses.
const MAX_NOTE_GRAPHEMES: usize = 32;

/// Everything the ledger page needs to render.
pub(crate) struct LedgerViewModel {
    /// Derived totals over the whole filtered statement, not just this page.
    pub(crate) summary: StatementSummary,
    /// The rows on the current page, newest first.
    pub(crate) rows: Vec<LedgerRow>,
    /// How many entries passed the filter across all pages.
    pub(crate) total_entries: usize,
    /// The pagination control elements.
    pub(crate) indicators: Vec<PageIndicator>,
    /// The normalized query, used to build filter and page links.
    pub(crate) params: LedgerQueryParams,
}

pub(crate) fn ledger_view(model: LedgerViewModel) -> Markup {
    let nav_bar = NavBar::new(endpoints::LEDGER_VIEW).into_html();
    let export_url = model.params.to_url(endpoints::LEDGER_EXPORT);
    let has_entries = !model.rows.is_empty();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 lg:max-w-5xl lg:w-full lg:mx-auto"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Ledger Statement" }

                    a href=(export_url) class=(LINK_STYLE) { "Download CSV" }
                }

                (summary_cards_html(&model.summary))

                (filter_form_html(&model.params))

                section class="rounded bg-gray-50 dark:bg-gray-800 overflow-hidden"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th class=(TABLE_CELL_STYLE) { "Date" }
                                th class=(TABLE_CELL_STYLE) { "Entry" }
                                th class=(TABLE_CELL_STYLE) { "Amount" }
                                th class=(TABLE_CELL_STYLE) { "Items" }
                                th class=(TABLE_CELL_STYLE) { "Note" }
                            }
                        }

                        tbody
                        {
                            @if has_entries {
                                @for row in &model.rows {
                                    (ledger_row_html(row))
                                }
                            } @else {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) colspan="5" data-empty-state="true"
                                    {
                                        "No entries match this statement filter."
                                    }
                                }
                            }
                        }
                    }

                    @if model.total_entries > 0 {
                        (pagination_html(&model.indicators, &model.params))
                    }
                }
            }
        }
    };

    base("Ledger", &content)
}

fn summary_cards_html(summary: &StatementSummary) -> Markup {
    let balance_hint = if summary.net_balance < 0.0 {
        "Customer owes the shop"
    } else {
        "Nothing outstanding"
    };

    html! {
        section class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4"
        {
            div class=(SUMMARY_CARD_STYLE) data-summary-card="credit"
            {
                span class="text-sm text-gray-600 dark:text-gray-400" { "Credit given" }
                span class="text-xl font-semibold" data-summary-value="credit-total"
                {
                    (format_currency(summary.credit_total))
                }
                span class="text-xs text-gray-500" { (summary.credit_count) " entries" }
            }

            div class=(SUMMARY_CARD_STYLE) data-summary-card="payment"
            {
                span class="text-sm text-gray-600 dark:text-gray-400" { "Payments received" }
                span class="text-xl font-semibold" data-summary-value="payment-total"
                {
                    (format_currency(summary.payment_total))
                }
                span class="text-xs text-gray-500" { (summary.payment_count) " entries" }
            }

            div class=(SUMMARY_CARD_STYLE) data-summary-card="balance"
            {
                span class="text-sm text-gray-600 dark:text-gray-400" { "Net balance" }
                span class="text-xl font-semibold" data-summary-value="net-balance"
                {
                    (format_currency(summary.net_balance))
                }
                span class="text-xs text-gray-500" { (balance_hint) }
            }

            div class=(SUMMARY_CARD_STYLE) data-summary-card="items"
            {
                span class="text-sm text-gray-600 dark:text-gray-400" { "Items purchased" }
                span class="text-xl font-semibold" data-summary-value="items-total"
                {
                    (format_quantity(summary.items_purchased_total))
                }
                span class="text-xs text-gray-500" { (summary.transaction_count) " entries in statement" }
            }
        }
    }
}

fn filter_form_html(params: &LedgerQueryParams) -> Markup {
    let from_value = params
        .from
        .map(|day| day.to_string())
        .unwrap_or_default();
    let to_value = params.to.map(|day| day.to_string()).unwrap_or_default();
    let party_value = params.party.clone().unwrap_or_default();

    html! {
        form
            method="get"
            action=(endpoints::LEDGER_VIEW)
            class="flex flex-wrap items-end gap-4 rounded bg-gray-50 dark:bg-gray-800 p-4"
        {
            div
            {
                label for="from" class=(FORM_LABEL_STYLE) { "From" }
                input type="date" name="from" id="from" value=(from_value) class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="to" class=(FORM_LABEL_STYLE) { "To" }
                input type="date" name="to" id="to" value=(to_value) class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="kind" class=(FORM_LABEL_STYLE) { "Entries" }
                select name="kind" id="kind" class=(FORM_SELECT_STYLE)
                {
                    @for option in [KindFilter::All, KindFilter::CreditGiven, KindFilter::PaymentReceived] {
                        option
                            value=(option.as_query_value())
                            selected[params.kind == option]
                        {
                            (option.label())
                        }
                    }
                }
            }

            div
            {
                label for="party" class=(FORM_LABEL_STYLE) { "Customer or shop" }
                input
                    type="text"
                    name="party"
                    id="party"
                    value=(party_value)
                    placeholder="ID"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            // Submitting the form drops the page parameter, so the redirect
            // normalization lands the new filter on page 1.
            input type="hidden" name="page_size" value=(params.page_size);

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply" }
        }
    }
}

fn ledger_row_html(row: &LedgerRow) -> Markup {
    let badge_style = match row.kind {
        EntryKind::CreditGiven => CREDIT_BADGE_STYLE,
        EntryKind::PaymentReceived => PAYMENT_BADGE_STYLE,
    };
    let amount_class = match row.kind {
        EntryKind::CreditGiven => "text-red-700 dark:text-red-300",
        EntryKind::PaymentReceived => "text-green-700 dark:text-green-300",
    };

    html! {
        tr class=(TABLE_ROW_STYLE) data-entry-row="true"
        {
            td class=(TABLE_CELL_STYLE) { (row.date_label) }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(badge_style) { (row.kind.label()) }
            }
            td class=(format!("{TABLE_CELL_STYLE} {amount_class}"))
            {
                (format_currency(row.amount))
            }
            td class=(TABLE_CELL_STYLE)
            {
                @if row.items_label.is_empty() {
                    span class="text-gray-400" { "—" }
                } @else {
                    (row.items_label)
                }
            }
            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(note) = &row.note {
                    (truncate_note(note))
                }
            }
        }
    }
}

fn pagination_html(indicators: &[PageIndicator], params: &LedgerQueryParams) -> Markup {
    let page_url = |page: u64| params.with_page(page).to_url(endpoints::LEDGER_VIEW);

    html! {
        nav class="pagination flex justify-between items-center p-4" aria-label="Statement pages"
        {
            ul class="pagination inline-flex -space-x-px text-sm"
            {
                @for indicator in indicators {
                    li
                    {
                        @match indicator {
                            PageIndicator::BackButton(page) => {
                                a href=(page_url(*page)) class=(LINK_STYLE) { "Previous" }
                            }
                            PageIndicator::Page(page) => {
                                a href=(page_url(*page)) class=(LINK_STYLE) { (page) }
                            }
                            PageIndicator::CurrPage(page) => {
                                span aria-current="page" class="font-bold px-1" { (page) }
                            }
                            PageIndicator::Ellipsis => {
                                span class="px-1" { "…" }
                            }
                            PageIndicator::NextButton(page) => {
                                a href=(page_url(*page)) class=(LINK_STYLE) { "Next" }
                            }
                        }
                    }
                }
            }

            span class="text-xs text-gray-500"
            {
                "Per page: "
                @for size in [10u64, 20, 50] {
                    // Changing the page size always restarts from page 1.
                    a
                        href=(params.with_page_size(size).to_url(endpoints::LEDGER_VIEW))
                        class=(LINK_STYLE)
                        data-page-size=(size)
                    {
                        (size)
                    }
                    " "
                }
            }
        }
    }
}

/// Format an item quantity, dropping a trailing `.0` for whole numbers.
pub(crate) fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{quantity:.0}")
    } else {
        format!("{quantity}")
    }
}

/// Format a calendar day for table rows, e.g. "5 Jan 2024".
pub(crate) fn format_date_label(date: Date) -> String {
    format!(
        "{} {} {}",
        date.day(),
        month_abbrev(date.month()),
        date.year()
    )
}

fn month_abbrev(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

fn truncate_note(note: &str) -> String {
    let graphemes: Vec<&str> = note.graphemes(true).collect();

    if graphemes.len() > MAX_NOTE_GRAPHEMES {
        format!("{}…", graphemes[..MAX_NOTE_GRAPHEMES].concat())
    } else {
        note.to_owned()
    }
}
