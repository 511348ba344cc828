//! The navigation bar shown at the top of every page, and at the bottom on small screens.

use maud::{Markup, html};

use crate::endpoints;

/// Where a link is shown in the bottom bar on small screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Always visible in the bottom bar.
    Primary,
    /// Tucked away in the "More" menu.
    More,
}

struct NavItem {
    url: &'static str,
    title: &'static str,
    placement: Placement,
    /// Whether the link can be highlighted as the current page.
    is_page: bool,
}

const NAV_ITEMS: [NavItem; 6] = [
    NavItem {
        url: endpoints::DASHBOARD_VIEW,
        title: "Dashboard",
        placement: Placement::Primary,
        is_page: true,
    },
    NavItem {
        url: endpoints::TRANSACTIONS_VIEW,
        title: "Transactions",
        placement: Placement::Primary,
        is_page: true,
    },
    NavItem {
        url: endpoints::BUDGETS_VIEW,
        title: "Budgets",
        placement: Placement::Primary,
        is_page: true,
    },
    NavItem {
        url: endpoints::CATEGORIES_VIEW,
        title: "Categories",
        placement: Placement::More,
        is_page: true,
    },
    NavItem {
        url: endpoints::SETTINGS_VIEW,
        title: "Settings",
        placement: Placement::More,
        is_page: true,
    },
    NavItem {
        url: endpoints::LOG_OUT,
        title: "Log out",
        placement: Placement::More,
        is_page: false,
    },
];

const DESKTOP_LINK_STYLE: &str = "block py-2 px-3 rounded-sm lg:p-0 lg:hover:bg-transparent \
    text-gray-900 hover:bg-gray-100 lg:hover:text-blue-700 dark:text-white \
    lg:dark:hover:text-blue-500 dark:hover:bg-gray-700";
const DESKTOP_CURRENT_LINK_STYLE: &str = "block py-2 px-3 rounded-sm lg:p-0 \
    text-white bg-blue-700 lg:bg-transparent lg:text-blue-700 dark:text-white lg:dark:text-blue-500";

const BOTTOM_TAB_STYLE: &str = "flex w-full min-w-0 items-center justify-center rounded-lg \
    px-2.5 py-2 text-xs font-semibold leading-tight sm:px-4 sm:text-sm cursor-pointer \
    text-gray-600 hover:bg-blue-50/70 hover:text-blue-700 \
    dark:text-gray-300 dark:hover:bg-blue-900/20 dark:hover:text-blue-200";
const BOTTOM_CURRENT_TAB_STYLE: &str = "flex w-full min-w-0 items-center justify-center rounded-lg \
    px-2.5 py-2 text-xs font-semibold leading-tight sm:px-4 sm:text-sm cursor-pointer \
    bg-blue-50 text-blue-700 shadow-sm dark:bg-blue-900/30 dark:text-blue-200";

const MORE_ITEM_STYLE: &str = "block rounded-lg px-3 py-2 text-gray-700 hover:bg-gray-100 \
    hover:text-blue-700 dark:text-gray-200 dark:hover:bg-gray-800/80 dark:hover:text-blue-200";
const MORE_CURRENT_ITEM_STYLE: &str =
    "block rounded-lg px-3 py-2 bg-blue-50 text-blue-700 dark:bg-blue-900/30 dark:text-blue-200";

/// The site navigation with the link for the current page highlighted.
pub struct NavBar<'a> {
    active_endpoint: &'a str,
}

impl NavBar<'_> {
    /// Get the navigation bar.
    ///
    /// The link whose URL matches `active_endpoint` exactly is highlighted. Pages
    /// without their own link, e.g. "/budgets/new", highlight nothing.
    pub fn new(active_endpoint: &str) -> NavBar<'_> {
        NavBar { active_endpoint }
    }

    fn is_current(&self, item: &NavItem) -> bool {
        item.is_page && item.url == self.active_endpoint
    }

    pub fn into_html(self) -> Markup {
        let more_is_current = NAV_ITEMS
            .iter()
            .any(|item| item.placement == Placement::More && self.is_current(item));

        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a href=(endpoints::ROOT) class="flex items-center gap-3"
                    {
                        img src="/static/favicon-128x128.png" alt="Pennywise Logo" class="h-8";

                        span class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "Pennywise"
                        }
                    }

                    ul class="hidden lg:flex lg:flex-row lg:gap-8 font-medium"
                    {
                        @for item in &NAV_ITEMS {
                            @let is_current = self.is_current(item);

                            li
                            {
                                a
                                    href=(item.url)
                                    class=(if is_current { DESKTOP_CURRENT_LINK_STYLE } else { DESKTOP_LINK_STYLE })
                                    aria-current=[is_current.then_some("page")]
                                {
                                    (item.title)
                                }
                            }
                        }
                    }
                }
            }

            nav class="fixed inset-x-0 bottom-0 z-40 lg:hidden" aria-label="Primary"
            {
                ul
                    class="mx-auto mb-4 grid max-w-screen-xl grid-cols-4 gap-2 rounded-xl border
                    border-gray-200 bg-white/95 px-4 py-3 shadow-lg backdrop-blur
                    dark:border-gray-700 dark:bg-gray-900/95"
                {
                    @for item in NAV_ITEMS.iter().filter(|item| item.placement == Placement::Primary) {
                        @let is_current = self.is_current(item);

                        li class="min-w-0"
                        {
                            a
                                href=(item.url)
                                class=(if is_current { BOTTOM_CURRENT_TAB_STYLE } else { BOTTOM_TAB_STYLE })
                                aria-current=[is_current.then_some("page")]
                            {
                                span class="truncate" { (item.title) }
                            }
                        }
                    }

                    li class="min-w-0"
                    {
                        details class="group relative"
                        {
                            summary
                                class={
                                    "list-none [&::-webkit-details-marker]:hidden "
                                    (if more_is_current { BOTTOM_CURRENT_TAB_STYLE } else { BOTTOM_TAB_STYLE })
                                }
                                aria-current=[more_is_current.then_some("page")]
                            {
                                span class="truncate" { "More" }
                            }

                            ul
                                class="absolute bottom-full right-0 mb-3 flex w-40 flex-col gap-1
                                rounded-xl border border-gray-200 bg-white/95 p-2 text-sm font-medium
                                shadow-xl dark:border-gray-700 dark:bg-gray-900/95"
                            {
                                @for item in NAV_ITEMS.iter().filter(|item| item.placement == Placement::More) {
                                    @let is_current = self.is_current(item);

                                    li
                                    {
                                        a
                                            href=(item.url)
                                            class=(if is_current { MORE_CURRENT_ITEM_STYLE } else { MORE_ITEM_STYLE })
                                            aria-current=[is_current.then_some("page")]
                                        {
                                            (item.title)
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        )
    }
}
