use tracing::info;

use crate::catalog::{AlbumFilter, Catalog, Photo, PhotoId};
use crate::error::Result;
use crate::slideshow::SlideshowController;
use crate::upload::UploadForm;

/// Grid view state: album bar, selection, and which overlays are open.
#[derive(Debug, Clone, Default)]
pub struct GalleryView {
    catalog: Catalog,
    selected_album: AlbumFilter,
    selected_photo: Option<usize>,
    show_upload: bool,
    show_music_player: bool,
    slideshow_open: bool,
}

impl GalleryView {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selected_album(&self) -> &AlbumFilter {
        &self.selected_album
    }

    pub fn selected_photo(&self) -> Option<usize> {
        self.selected_photo
    }

    pub fn is_upload_open(&self) -> bool {
        self.show_upload
    }

    pub fn is_music_player_open(&self) -> bool {
        self.show_music_player
    }

    pub fn is_slideshow_open(&self) -> bool {
        self.slideshow_open
    }

    pub fn album_choices(&self) -> Vec<String> {
        self.catalog.album_choices()
    }

    /// Albums offered by the upload form (`"All"` excluded).
    pub fn upload_albums(&self) -> Vec<String> {
        self.catalog.albums()
    }

    pub fn select_album(&mut self, filter: AlbumFilter) {
        self.selected_album = filter;
    }

    /// Selects a tile by its index in the filtered grid. Indices past the end
    /// are ignored.
    pub fn select_photo(&mut self, index: usize) {
        if index < self.filtered().len() {
            self.selected_photo = Some(index);
        }
    }

    pub fn filtered(&self) -> Vec<Photo> {
        self.catalog.filtered(&self.selected_album)
    }

    /// Header line, e.g. `"2 photos in Nature"`.
    pub fn summary(&self) -> String {
        format!(
            "{} photos in {}",
            self.filtered().len(),
            self.selected_album.label()
        )
    }

    pub fn open_upload(&mut self) {
        self.show_upload = true;
    }

    /// A blank upload form over the current albums. `fallback_album` is
    /// preselected when the catalog has no albums yet.
    pub fn upload_form(&self, fallback_album: &str) -> UploadForm {
        UploadForm::new(self.upload_albums(), fallback_album)
    }

    pub fn close_upload(&mut self) {
        self.show_upload = false;
    }

    pub fn toggle_music_player(&mut self) {
        self.show_music_player = !self.show_music_player;
    }

    pub fn close_music_player(&mut self) {
        self.show_music_player = false;
    }

    /// Receives a photo from the upload form.
    pub fn add_photo(&mut self, photo: Photo) -> PhotoId {
        self.catalog.add(photo)
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// Snapshots the filtered photos into a slideshow starting at the
    /// selected tile (or the first one). Also opens the music player.
    pub fn launch_slideshow(&mut self) -> Result<SlideshowController> {
        let start = self.selected_photo.unwrap_or(0);
        let controller = SlideshowController::new(self.filtered(), start)?;
        info!(
            album = self.selected_album.label(),
            start,
            len = controller.len(),
            "launching slideshow"
        );
        self.slideshow_open = true;
        self.show_music_player = true;
        Ok(controller)
    }

    /// Handles the slideshow's close notification.
    pub fn slideshow_closed(&mut self) {
        self.slideshow_open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::upload::AlbumChoice;

    #[test]
    fn summary_follows_album_filter() {
        let mut gallery = GalleryView::new(Catalog::sample());
        assert_eq!(gallery.summary(), "5 photos in All");
        gallery.select_album(AlbumFilter::from_label("Nature"));
        assert_eq!(gallery.summary(), "2 photos in Nature");
        assert_eq!(gallery.upload_albums(), vec!["Nature", "Portraits", "Home", "Pets"]);
    }

    #[test]
    fn slideshow_starts_at_selected_tile_of_filtered_grid() {
        let mut gallery = GalleryView::new(Catalog::sample());
        gallery.select_album(AlbumFilter::from_label("Nature"));
        gallery.select_photo(1);
        let controller = gallery.launch_slideshow().unwrap();
        assert_eq!(controller.len(), 2);
        assert_eq!(controller.current().title, "Wildlife");
        assert!(gallery.is_slideshow_open());
        assert!(gallery.is_music_player_open());

        gallery.slideshow_closed();
        assert!(!gallery.is_slideshow_open());
    }

    #[test]
    fn out_of_range_selection_is_ignored() {
        let mut gallery = GalleryView::new(Catalog::sample());
        gallery.select_photo(42);
        assert_eq!(gallery.selected_photo(), None);
        assert_eq!(gallery.launch_slideshow().unwrap().position(), 0);
    }

    #[test]
    fn empty_album_cannot_launch() {
        let mut gallery = GalleryView::new(Catalog::sample());
        gallery.select_album(AlbumFilter::from_label("Nowhere"));
        assert!(matches!(gallery.launch_slideshow(), Err(Error::EmptySlideshow)));
        assert!(!gallery.is_slideshow_open());
    }

    #[test]
    fn slideshow_is_a_snapshot() {
        let mut gallery = GalleryView::new(Catalog::sample());
        let controller = gallery.launch_slideshow().unwrap();
        let extra = gallery.catalog().get(0).unwrap().clone();
        gallery.add_photo(extra);
        assert_eq!(controller.len(), 5);
        assert_eq!(gallery.catalog().len(), 6);
    }

    #[test]
    fn upload_form_falls_back_to_configured_album() {
        let gallery = GalleryView::new(Catalog::new());
        let form = gallery.upload_form("Family");
        assert_eq!(form.album(), &AlbumChoice::Existing("Family".into()));

        let gallery = GalleryView::new(Catalog::sample());
        let form = gallery.upload_form("Family");
        assert_eq!(form.album(), &AlbumChoice::Existing("Nature".into()));
    }
}
