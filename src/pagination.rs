//! Paging through long lists and the page links shown under them.

use maud::{Markup, html};

use crate::html::LINK_STYLE;

/// Defaults for paged lists.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page shown when the request does not ask for one.
    pub default_page: u64,
    /// Rows per page when the request does not ask for a size.
    pub default_page_size: u64,
    /// How many numbered page links to show around the current page.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 20,
            max_pages: 5,
        }
    }
}

/// One entry in the row of page links.
#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

/// The number of pages needed for `row_count` rows. Never less than one.
pub fn page_count(row_count: u64, page_size: u64) -> u64 {
    match page_size {
        0 => 1,
        size => row_count.div_ceil(size).max(1),
    }
}

/// Lay out the page links for `curr_page` of `page_count` pages.
///
/// At most `max_pages` numbered links are shown in a window that follows the
/// current page. The first and last pages stay reachable outside the window,
/// with an ellipsis for any pages skipped. Back and Next buttons are added
/// when there is a page to go to.
pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let (first, last) = if page_count <= max_pages {
        (1, page_count)
    } else {
        let first = curr_page
            .saturating_sub(max_pages / 2)
            .clamp(1, page_count - max_pages + 1);
        (first, first + max_pages - 1)
    };

    let mut indicators = Vec::with_capacity(max_pages as usize + 6);

    if curr_page > 1 {
        indicators.push(PaginationIndicator::BackButton(curr_page - 1));
    }

    if first > 1 {
        indicators.push(PaginationIndicator::Page(1));
        if first > 2 {
            indicators.push(PaginationIndicator::Ellipsis);
        }
    }

    indicators.extend((first..=last).map(|page| match page == curr_page {
        true => PaginationIndicator::CurrPage(page),
        false => PaginationIndicator::Page(page),
    }));

    if last < page_count {
        if last + 1 < page_count {
            indicators.push(PaginationIndicator::Ellipsis);
        }
        indicators.push(PaginationIndicator::Page(page_count));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

/// Render `indicators` as links, using `page_url` to build each page's URL so
/// that callers can keep their filters in the query string.
pub fn pagination_view(
    indicators: &[PaginationIndicator],
    page_url: impl Fn(u64) -> String,
) -> Markup {
    if indicators.is_empty() {
        return html!();
    }

    html! {
        nav class="pagination flex justify-center my-4" aria-label="Pagination" {
            ul class="pagination flex gap-2 items-center" {
                @for indicator in indicators {
                    li {
                        @match indicator {
                            PaginationIndicator::CurrPage(page) => {
                                p aria-current="page" class="px-3 py-1 rounded bg-blue-600 text-white" { (page) }
                            }
                            PaginationIndicator::Page(page) => {
                                a href=(page_url(*page)) class=(LINK_STYLE) { (page) }
                            }
                            PaginationIndicator::Ellipsis => {
                                span class="text-gray-500" { "..." }
                            }
                            PaginationIndicator::BackButton(page) => {
                                a href=(page_url(*page)) class=(LINK_STYLE) aria-label="Previous page" { "Back" }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a href=(page_url(*page)) class=(LINK_STYLE) aria-label="Next page" { "Next" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod pagination_tests {
    use scraper::{Html, Selector};

    use super::{
        PaginationIndicator::{self, BackButton, CurrPage, Ellipsis, NextButton, Page},
        create_pagination_indicators, page_count, pagination_view,
    };

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 20), 1);
        assert_eq!(page_count(20, 20), 1);
        assert_eq!(page_count(21, 20), 2);
        assert_eq!(page_count(5, 0), 1);
    }

    #[test]
    fn indicators_follow_current_page() {
        let cases: [(u64, u64, Vec<PaginationIndicator>); 7] = [
            (1, 1, vec![CurrPage(1)]),
            (
                1,
                5,
                vec![CurrPage(1), Page(2), Page(3), Page(4), Page(5), NextButton(2)],
            ),
            (
                1,
                10,
                vec![
                    CurrPage(1),
                    Page(2),
                    Page(3),
                    Page(4),
                    Page(5),
                    Ellipsis,
                    Page(10),
                    NextButton(2),
                ],
            ),
            (
                3,
                10,
                vec![
                    BackButton(2),
                    Page(1),
                    Page(2),
                    CurrPage(3),
                    Page(4),
                    Page(5),
                    Ellipsis,
                    Page(10),
                    NextButton(4),
                ],
            ),
            (
                5,
                10,
                vec![
                    BackButton(4),
                    Page(1),
                    Ellipsis,
                    Page(3),
                    Page(4),
                    CurrPage(5),
                    Page(6),
                    Page(7),
                    Ellipsis,
                    Page(10),
                    NextButton(6),
                ],
            ),
            (
                8,
                10,
                vec![
                    BackButton(7),
                    Page(1),
                    Ellipsis,
                    Page(6),
                    Page(7),
                    CurrPage(8),
                    Page(9),
                    Page(10),
                    NextButton(9),
                ],
            ),
            (
                10,
                10,
                vec![
                    BackButton(9),
                    Page(1),
                    Ellipsis,
                    Page(6),
                    Page(7),
                    Page(8),
                    Page(9),
                    CurrPage(10),
                ],
            ),
        ];

        for (curr_page, pages, want) in cases {
            assert_eq!(
                create_pagination_indicators(curr_page, pages, 5),
                want,
                "page {curr_page} of {pages}"
            );
        }
    }

    #[test]
    fn no_ellipsis_when_window_is_next_to_first_page() {
        assert_eq!(
            create_pagination_indicators(4, 10, 5),
            vec![
                BackButton(3),
                Page(1),
                Page(2),
                Page(3),
                CurrPage(4),
                Page(5),
                Page(6),
                Ellipsis,
                Page(10),
                NextButton(5),
            ]
        );
    }

    #[test]
    fn current_page_is_not_a_link() {
        let indicators = [BackButton(1), Page(1), CurrPage(2), Page(3), NextButton(3)];

        let markup = pagination_view(&indicators, |page| format!("/items?page={page}"));
        let html = Html::parse_fragment(&markup.into_string());

        let current = html
            .select(&Selector::parse("p[aria-current=page]").unwrap())
            .next()
            .expect("No current page indicator");
        assert_eq!(current.text().collect::<String>().trim(), "2");
        let links: Vec<_> = html
            .select(&Selector::parse("a").unwrap())
            .filter_map(|link| link.value().attr("href"))
            .collect();
        assert_eq!(
            links,
            vec!["/items?page=1", "/items?page=1", "/items?page=3", "/items?page=3"]
        );
    }

    #[test]
    fn no_indicators_render_nothing() {
        assert!(pagination_view(&[], |page| page.to_string()).into_string().is_empty());
    }
}
