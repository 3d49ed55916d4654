/// Fallback card height in pixels when no heights have been measured yet
pub const DEFAULT_ITEM_HEIGHT_PX: f32 = 120.0;

/// Vertical gap between stacked cards in pixels
pub const DEFAULT_CARD_SPACING_PX: f32 = 16.0;

/// Group label for accounts whose platform row is missing
pub const UNKNOWN_PLATFORM_GROUP: &str = "Unknown platform";

/// Capacity of the table-change broadcast channel
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Capacity of the write actor's job queue
pub const WRITER_QUEUE_CAPACITY: usize = 1024;
