use std::collections::HashMap;

use gtk4 as gtk;
use libadwaita as adw;

use birthday_surprise::balloons::{BalloonGame, BalloonId, DeviceClass};
use birthday_surprise::card::GreetingCard;
use birthday_surprise::config::GreetingConfig;
use birthday_surprise::gallery::Gallery;
use birthday_surprise::music::MusicControl;
use birthday_surprise::sections::{CakeLayer, Section, SectionController, TrailThrottle};

use super::effects::SparkLayer;
use super::media::GtkAudio;

/// Widgets of the four full-window sections.
#[derive(Default)]
pub struct SectionViews {
    pub intro: Option<gtk::Widget>,
    pub main: Option<gtk::Widget>,
    pub game: Option<gtk::Widget>,
    pub cake: Option<gtk::Widget>,
}

impl SectionViews {
    pub fn get(&self, section: Section) -> Option<&gtk::Widget> {
        match section {
            Section::Intro => self.intro.as_ref(),
            Section::Main => self.main.as_ref(),
            Section::Game => self.game.as_ref(),
            Section::Cake => self.cake.as_ref(),
        }
    }
}

#[derive(Default)]
pub struct GalleryWidgets {
    pub open_button: Option<gtk::Button>,
    pub open_handler: Option<glib::SignalHandlerId>,
    pub strip: Option<gtk::ScrolledWindow>,
    pub close_strip: Option<gtk::Button>,
    pub strip_items: Vec<gtk::Widget>,
    pub grid: Option<gtk::ScrolledWindow>,
    pub close_grid: Option<gtk::Button>,
    pub grid_items: Vec<gtk::FlowBoxChild>,
    pub continue_button: Option<gtk::Button>,
    pub preview: Option<gtk::Widget>,
    pub preview_stack: Option<gtk::Stack>,
    pub transition_overlay: Option<gtk::Widget>,
    pub main_scroller: Option<gtk::ScrolledWindow>,
}

#[derive(Default)]
pub struct CardWidgets {
    pub shell: Option<gtk::Overlay>,
    pub front: Option<gtk::Widget>,
    pub inner: Option<gtk::Widget>,
    pub toggle_button: Option<gtk::Button>,
}

#[derive(Default)]
pub struct GameWidgets {
    pub play_area: Option<gtk::Fixed>,
    pub ambient_layer: Option<gtk::Fixed>,
    pub balloons: HashMap<BalloonId, gtk::DrawingArea>,
    pub counter_label: Option<gtk::Label>,
    pub found_label: Option<gtk::Label>,
}

#[derive(Default)]
pub struct CakeWidgets {
    pub message: Option<gtk::Label>,
    pub layers: Vec<(CakeLayer, gtk::Widget)>,
    pub wishes: Option<gtk::Label>,
    pub sparkle_layer: Option<gtk::Fixed>,
}

pub struct AppState {
    pub config: GreetingConfig,
    pub device: DeviceClass,

    pub window: Option<adw::ApplicationWindow>,
    pub title_subtitle: Option<gtk::Label>,
    pub music_button: Option<gtk::Button>,
    pub views: SectionViews,
    pub gallery_widgets: GalleryWidgets,
    pub card_widgets: CardWidgets,
    pub game_widgets: GameWidgets,
    pub cake_widgets: CakeWidgets,
    pub sparks: Option<SparkLayer>,

    pub sections: SectionController,
    pub game: BalloonGame,
    pub game_started: bool,
    pub gallery: Gallery,
    pub card: GreetingCard,
    pub music: MusicControl,
    pub audio: GtkAudio,
    pub trail: TrailThrottle,
    /// Bumped on every debug jump so delayed banners restore the right text.
    pub banner_id: u64,
}

impl AppState {
    pub fn new(config: GreetingConfig, device: DeviceClass) -> Self {
        let music = MusicControl::new(config.primary_track(), config.fallback_track());
        let photo_count = config.photos.len();
        AppState {
            config,
            device,
            window: None,
            title_subtitle: None,
            music_button: None,
            views: SectionViews::default(),
            gallery_widgets: GalleryWidgets::default(),
            card_widgets: CardWidgets::default(),
            game_widgets: GameWidgets::default(),
            cake_widgets: CakeWidgets::default(),
            sparks: None,
            sections: SectionController::new(),
            game: BalloonGame::new(),
            game_started: false,
            gallery: Gallery::new(photo_count),
            card: GreetingCard::new(),
            music,
            audio: GtkAudio::default(),
            trail: TrailThrottle::default(),
            banner_id: 0,
        }
    }
}
