// Display helpers with local state only; nothing here touches the network

use crate::models::Image;

pub const DEFAULT_TOTAL_STARS: usize = 5;

// Image slider that wraps around in both directions
#[derive(Debug, Clone, Default)]
pub struct Carousel {
    images: Vec<Image>,
    index: usize,
}

impl Carousel {
    pub fn new(images: Vec<Image>) -> Self {
        Self { images, index: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Image> {
        self.images.get(self.index)
    }

    // Navigation arrows are only shown with more than one image
    pub fn has_controls(&self) -> bool {
        self.images.len() > 1
    }

    pub fn next(&mut self) -> Option<&Image> {
        if !self.images.is_empty() {
            self.index = (self.index + 1) % self.images.len();
        }
        self.current()
    }

    pub fn previous(&mut self) -> Option<&Image> {
        if !self.images.is_empty() {
            self.index = self.index.checked_sub(1).unwrap_or(self.images.len() - 1);
        }
        self.current()
    }

    pub fn go_to(&mut self, index: usize) -> Option<&Image> {
        if index < self.images.len() {
            self.index = index;
        }
        self.current()
    }

    // "Seaside Inn 2" for the second image
    pub fn alt_text(&self, label: &str) -> String {
        format!("{} {}", label, self.index + 1)
    }
}

// Bounded integer input such as the guest count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    value: u32,
    min: u32,
    max: u32,
}

impl Counter {
    pub fn new(value: u32, min: u32, max: u32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            value: value.clamp(min, max),
            min,
            max,
        }
    }

    pub fn guests() -> Self {
        Self::new(1, 1, 10)
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn increment(&mut self) -> u32 {
        self.value = self.value.saturating_add(1).min(self.max);
        self.value
    }

    pub fn decrement(&mut self) -> u32 {
        self.value = self.value.saturating_sub(1).max(self.min);
        self.value
    }

    pub fn set(&mut self, value: u32) -> u32 {
        self.value = value.clamp(self.min, self.max);
        self.value
    }

    pub fn can_increment(&self) -> bool {
        self.value < self.max
    }

    pub fn can_decrement(&self) -> bool {
        self.value > self.min
    }
}

// Which of `total` stars are filled for `rating`, rounded to the nearest star
pub fn star_fill(rating: f64, total: usize) -> Vec<bool> {
    let filled = if rating.is_finite() && rating > 0.0 {
        rating.round() as usize
    } else {
        0
    };
    (0..total).map(|i| i < filled).collect()
}

pub fn star_rating(rating: f64) -> String {
    star_fill(rating, DEFAULT_TOTAL_STARS)
        .into_iter()
        .map(|filled| if filled { '★' } else { '☆' })
        .collect()
}

// Client-side pagination window. `page` is 1-based and clamped to the
// available pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);
    let items = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();
    Page {
        items,
        page,
        total_pages,
        total_items,
    }
}
