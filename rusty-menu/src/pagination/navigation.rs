//! Page position tracking and construction-time size checks.

use crate::error::{MenuError, MenuResult, SizeLimit};
use crate::page::{RenderSize, Renderable};

use super::buttons::ButtonAction;

/// What the session must do after an action was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// State changed; render the current page once.
    Rerender,
    /// Tear the session down.
    Stop,
}

/// Current 1-based page and page count.
///
/// `1 <= current <= total` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationState {
    current: usize,
    total: usize,
}

impl NavigationState {
    pub fn new(total_pages: usize) -> Self {
        Self {
            current: 1,
            total: total_pages.max(1),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Paging controls only make sense with more than one page.
    pub fn has_navigation(&self) -> bool {
        self.total > 1
    }

    pub fn first(&mut self) {
        self.current = 1;
    }

    pub fn last(&mut self) {
        self.current = self.total;
    }

    /// Step back, wrapping from the first page to the last.
    pub fn previous(&mut self) {
        self.current = (self.current + self.total - 2) % self.total + 1;
    }

    /// Step forward, wrapping from the last page to the first.
    pub fn next(&mut self) {
        self.current = self.current % self.total + 1;
    }

    pub fn set(&mut self, page: usize) -> MenuResult<()> {
        if !(1..=self.total).contains(&page) {
            return Err(MenuError::PageOutOfRange {
                requested: page,
                total: self.total,
            });
        }
        self.current = page;
        Ok(())
    }

    /// Account for a page inserted anywhere in the list.
    pub fn page_added(&mut self) {
        self.total += 1;
    }

    /// Apply a control action. Only [`ButtonAction::Stop`] ends the session.
    pub fn apply(&mut self, action: ButtonAction) -> Dispatch {
        match action {
            ButtonAction::FirstPage => self.first(),
            ButtonAction::PreviousPage => self.previous(),
            ButtonAction::NextPage => self.next(),
            ButtonAction::LastPage => self.last(),
            ButtonAction::Stop => return Dispatch::Stop,
        }
        Dispatch::Rerender
    }
}

/// Resolve a 1-based insert position; `None` appends.
pub fn insert_position(position: Option<usize>, total_pages: usize) -> MenuResult<usize> {
    let end = total_pages + 1;
    match position {
        None => Ok(end),
        Some(position) if (1..=end).contains(&position) => Ok(position),
        Some(position) => Err(MenuError::PageOutOfRange {
            requested: position,
            total: end,
        }),
    }
}

/// Check one page, rendered with `footer`, against the transport limits.
/// `number` is 1-based.
pub fn check_page_size(page: &impl Renderable, number: usize, footer: &str) -> MenuResult<()> {
    let too_large = |limit: SizeLimit, size: usize| {
        (size > limit.max()).then_some(MenuError::PageTooLarge {
            page: number,
            limit,
            size,
        })
    };

    let violation = match page.size(footer) {
        RenderSize::Content(size) => too_large(SizeLimit::MessageContent, size),
        RenderSize::Embed { total, description } => too_large(SizeLimit::EmbedTotal, total)
            .or_else(|| too_large(SizeLimit::EmbedDescription, description)),
    };

    if let Some(violation) = violation {
        return Err(violation);
    }

    page.check_limits(footer).map_err(|reason| MenuError::InvalidEmbed {
        page: number,
        reason,
    })
}

/// Check every page once, in order, stopping at the first violation.
///
/// `footer` gives the footer each page will be rendered with; pass the
/// widest one the menu can produce.
pub fn validate_page_sizes<'a, R, F>(
    pages: impl IntoIterator<Item = &'a R>,
    footer: F,
) -> MenuResult<()>
where
    R: Renderable + 'a,
    F: Fn(&R) -> String,
{
    pages
        .into_iter()
        .enumerate()
        .try_for_each(|(index, page)| check_page_size(page, index + 1, &footer(page)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Page, RenderedPage};

    #[test]
    fn every_action_keeps_index_in_range() {
        let actions = [
            ButtonAction::FirstPage,
            ButtonAction::PreviousPage,
            ButtonAction::NextPage,
            ButtonAction::LastPage,
        ];

        for total in 1..=5 {
            for start in 1..=total {
                for action in actions {
                    let mut state = NavigationState::new(total);
                    state.set(start).unwrap();
                    assert_eq!(state.apply(action), Dispatch::Rerender);
                    assert!((1..=total).contains(&state.current()), "{action:?} {start}/{total}");
                }
            }
        }
    }

    #[test]
    fn previous_and_next_wrap_at_both_ends() {
        let mut state = NavigationState::new(3);
        state.previous();
        assert_eq!(state.current(), 3);
        state.next();
        assert_eq!(state.current(), 1);

        state.set(2).unwrap();
        state.next();
        assert_eq!(state.current(), 3);
    }

    #[test]
    fn first_then_last_lands_on_last_from_anywhere() {
        for start in 1..=4 {
            let mut state = NavigationState::new(4);
            state.set(start).unwrap();
            state.first();
            state.last();
            let once = state.current();
            state.first();
            state.last();
            assert_eq!(once, 4);
            assert_eq!(state.current(), once);
        }
    }

    #[test]
    fn set_out_of_range_leaves_index_unchanged() {
        let mut state = NavigationState::new(3);
        state.set(2).unwrap();

        for bad in [0, 4, 100] {
            assert!(matches!(
                state.set(bad),
                Err(MenuError::PageOutOfRange { requested, total: 3 }) if requested == bad
            ));
            assert_eq!(state.current(), 2);
        }
    }

    #[test]
    fn stop_does_not_move() {
        let mut state = NavigationState::new(3);
        state.set(2).unwrap();
        assert_eq!(state.apply(ButtonAction::Stop), Dispatch::Stop);
        assert_eq!(state.current(), 2);
    }

    #[test]
    fn insert_position_defaults_to_append() {
        assert_eq!(insert_position(None, 3).unwrap(), 4);
        assert_eq!(insert_position(Some(1), 3).unwrap(), 1);
        assert!(insert_position(Some(0), 3).is_err());
        assert!(insert_position(Some(5), 3).is_err());
    }

    struct FixedSize(RenderSize);

    impl Renderable for FixedSize {
        fn render(&self, _footer: &str) -> RenderedPage {
            RenderedPage {
                content: Some(String::new()),
                embed: None,
            }
        }

        fn size(&self, _footer: &str) -> RenderSize {
            self.0
        }
    }

    fn own_footer(page: &Page) -> String {
        page.footer().to_owned()
    }

    #[test]
    fn size_validation_reports_first_offending_page() {
        let pages = [
            FixedSize(RenderSize::Content(2000)),
            FixedSize(RenderSize::Embed {
                total: 100,
                description: 2049,
            }),
            FixedSize(RenderSize::Content(5000)),
        ];

        assert!(matches!(
            validate_page_sizes(&pages, |_| String::new()),
            Err(MenuError::PageTooLarge {
                page: 2,
                limit: SizeLimit::EmbedDescription,
                size: 2049,
            })
        ));
    }

    #[test]
    fn embed_total_is_checked_before_description() {
        let page = FixedSize(RenderSize::Embed {
            total: 6001,
            description: 3000,
        });
        assert!(matches!(
            check_page_size(&page, 1, ""),
            Err(MenuError::PageTooLarge {
                limit: SizeLimit::EmbedTotal,
                ..
            })
        ));
    }

    #[test]
    fn real_pages_are_measured_without_change() {
        let pages = vec![Page::new("x".repeat(2001))];
        let before = pages.clone();

        assert!(matches!(
            validate_page_sizes(&pages, own_footer),
            Err(MenuError::PageTooLarge {
                page: 1,
                limit: SizeLimit::MessageContent,
                size: 2001,
            })
        ));
        assert_eq!(pages, before);
    }

    #[test]
    fn footer_counts_towards_the_limit() {
        let page = Page::new("x".repeat(1990));

        assert!(check_page_size(&page, 1, "").is_ok());
        assert!(matches!(
            check_page_size(&page, 1, "page 10/10"),
            Err(MenuError::PageTooLarge { size: 2002, .. })
        ));
    }

    #[test]
    fn embed_limits_beyond_size_are_reported() {
        let page = Page::embedded("body").with_title("t".repeat(300));

        assert!(matches!(
            check_page_size(&page, 2, ""),
            Err(MenuError::InvalidEmbed { page: 2, .. })
        ));
    }
}
