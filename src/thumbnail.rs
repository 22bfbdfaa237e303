//! Best-effort thumbnail loading for the books on display.
//!
//! Each displayed book owns a slot on a [ThumbnailBoard]. Slots are addressed
//! with a [SlotHandle] that carries the board generation at the time the list
//! was shown; when the list is replaced the generation moves on and results
//! still in flight for the old list are dropped on arrival.

use std::fmt::Display;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error};
use url::Url;

use crate::{client::Fetcher, types::book::Book};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Recognise an image by its leading signature bytes
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, ..] => Some(Self::Png),
            [0xff, 0xd8, 0xff, ..] => Some(Self::Jpeg),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(Self::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            _ => None,
        }
    }
}

impl Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Thumbnail {
    Image { format: ImageFormat, bytes: Vec<u8> },
    /// Shown whenever there is no usable image
    Placeholder,
}

impl Thumbnail {
    pub fn decode(bytes: Vec<u8>) -> Self {
        match ImageFormat::sniff(&bytes) {
            Some(format) => Self::Image { format, bytes },
            None => {
                error!("Error while decoding image ({} bytes)", bytes.len());
                Self::Placeholder
            }
        }
    }
}

impl Display for Thumbnail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image { format, bytes } => write!(f, "{format} image, {} bytes", bytes.len()),
            Self::Placeholder => write!(f, "default cover"),
        }
    }
}

/// Download and decode the thumbnail at `url`. Never fails: every problem
/// is logged and gives [Thumbnail::Placeholder].
pub async fn load_thumbnail(fetcher: &Fetcher, url: Option<&str>) -> Thumbnail {
    let Some(url) = url else {
        return Thumbnail::Placeholder;
    };
    let url = match Url::parse(url) {
        Ok(url) => url,
        Err(e) => {
            error!("Error while creating URL {url:?}: {e}");
            return Thumbnail::Placeholder;
        }
    };
    match fetcher.get_bytes(url).await {
        Ok(bytes) => Thumbnail::decode(bytes),
        Err(e) => {
            error!("Error while downloading image: {e}");
            Thumbnail::Placeholder
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotHandle {
    index:      usize,
    generation: u64,
}

impl SlotHandle {
    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    Loading,
    Loaded(Thumbnail),
}

/// Thumbnail slots for the list currently on display
#[derive(Debug, Default)]
pub struct ThumbnailBoard {
    generation: u64,
    slots:      Vec<SlotState>,
}

impl ThumbnailBoard {
    /// Throw away every slot and create `len` fresh ones. Handles to the old
    /// slots become stale.
    pub fn reset(&mut self, len: usize) -> Vec<SlotHandle> {
        self.generation += 1;
        self.slots = vec![SlotState::Loading; len];
        (0..len)
            .map(|index| SlotHandle {
                index,
                generation: self.generation,
            })
            .collect()
    }

    /// Store a finished thumbnail. Returns `false` and drops it when the
    /// handle belongs to a list that is no longer shown.
    pub fn apply(&mut self, handle: SlotHandle, thumbnail: Thumbnail) -> bool {
        if handle.generation != self.generation {
            debug!("Dropping thumbnail for replaced slot {}", handle.index);
            return false;
        }
        match self.slots.get_mut(handle.index) {
            Some(slot) => {
                *slot = SlotState::Loaded(thumbnail);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<&SlotState> {
        self.slots.get(index)
    }
}

/// Spawns thumbnail downloads and collects their results for the board
pub struct ThumbnailLoader {
    fetcher:  Fetcher,
    board:    ThumbnailBoard,
    sender:   UnboundedSender<(SlotHandle, Thumbnail)>,
    receiver: UnboundedReceiver<(SlotHandle, Thumbnail)>,
}

impl ThumbnailLoader {
    pub fn new(fetcher: Fetcher) -> Self {
        let (sender, receiver) = unbounded_channel();
        Self {
            fetcher,
            board: ThumbnailBoard::default(),
            sender,
            receiver,
        }
    }

    pub fn board(&self) -> &ThumbnailBoard {
        &self.board
    }

    /// Replace the board with one slot per book and start a download for
    /// each. Must be called from within a tokio runtime.
    pub fn show(&mut self, books: &[Book]) {
        for (handle, book) in self.board.reset(books.len()).into_iter().zip(books) {
            let fetcher = self.fetcher.clone();
            let sender = self.sender.clone();
            let url = book.image_url.clone();
            tokio::spawn(async move {
                let thumbnail = load_thumbnail(&fetcher, url.as_deref()).await;
                let _ = sender.send((handle, thumbnail));
            });
        }
    }

    /// Apply every finished download without waiting. Returns how many
    /// landed on the current board.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok((handle, thumbnail)) = self.receiver.try_recv() {
            if self.board.apply(handle, thumbnail) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next finished download and apply it
    pub async fn next(&mut self) -> Option<bool> {
        let (handle, thumbnail) = self.receiver.recv().await?;
        Some(self.board.apply(handle, thumbnail))
    }
}
