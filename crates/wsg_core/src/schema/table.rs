//! Field table for the World of Tanks `preferences.xml` dialect.
//!
//! Control fields are listed once and expanded per mode when the registry
//! is built, so every mode gets its own `mode/field` key.

use super::key::Category;
use super::rule::SettingKind;

use Category::{Control, Device, Graphics, Sound};
use SettingKind::{BooleanTrueFalse, BooleanZeroOne, FreeString, NonEditable};

/// One row of the compact field table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub category: Category,
    pub field: &'static str,
    pub kind: SettingKind,
    pub label: &'static str,
}

/// A named control mode under `controlMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlMode {
    pub name: &'static str,
    pub label: &'static str,
}

const fn field(
    category: Category,
    field: &'static str,
    kind: SettingKind,
    label: &'static str,
) -> FieldSpec {
    FieldSpec {
        category,
        field,
        kind,
        label,
    }
}

const VOLUME: SettingKind = SettingKind::float(0.0, 1.0, 2);
const UNIT: SettingKind = SettingKind::float(0.0, 1.0, 2);
const SENSITIVITY: SettingKind = SettingKind::float(0.01, 1.0, 2);

/// Simple (non-mode) fields.
pub const FIELDS: &[FieldSpec] = &[
    // soundPrefs
    field(Sound, "masterVolume", VOLUME, "Master volume"),
    field(Sound, "volume_micVivox", VOLUME, "Voice chat microphone"),
    field(Sound, "volume_vehicles", VOLUME, "Vehicles volume"),
    field(Sound, "volume_music", VOLUME, "Music volume"),
    field(Sound, "volume_effects", VOLUME, "Effects volume"),
    field(Sound, "volume_ambient", VOLUME, "Ambient volume"),
    field(Sound, "volume_gui", VOLUME, "Interface volume"),
    field(Sound, "volume_voice", VOLUME, "Voice messages volume"),
    field(Sound, "soundMode", NonEditable, "Sound mode"),
    field(Sound, "bass_boost", FreeString, "Bass boost"),
    // graphicsPreferences, direct children
    field(Graphics, "graphicsSettingsVersion", NonEditable, "Graphics settings version"),
    field(Graphics, "graphicsSettingsVersionMinor", NonEditable, "Graphics settings minor version"),
    field(
        Graphics,
        "graphicsSettingsVersionMaintainance",
        NonEditable,
        "Graphics settings patch version",
    ),
    field(Graphics, "graphicsSettingsStatus", NonEditable, "Graphics settings status"),
    field(
        Graphics,
        "ParticlSystemNoRenderGroup",
        SettingKind::integer(65535, 65535),
        "Hidden particle group",
    ),
    field(Graphics, "distributionLevel", NonEditable, "Distribution level"),
    field(Graphics, "colorGradingStrength", UNIT, "Color grading strength"),
    field(Graphics, "brightnessDeferred", UNIT, "Brightness"),
    field(Graphics, "contrastDeferred", UNIT, "Contrast"),
    field(Graphics, "saturationDeferred", UNIT, "Saturation"),
    // graphicsPreferences, <entry> labels
    field(Graphics, "COLOR_GRADING_TECHNIQUE", NonEditable, "Color grading technique"),
    field(Graphics, "CUSTOM_AA_MODE", SettingKind::integer(0, 2), "Anti-aliasing mode"),
    field(Graphics, "DECOR_LEVEL", SettingKind::integer(0, 4), "Decoration detail"),
    field(Graphics, "DRR_AUTOSCALER_ENABLED", NonEditable, "Dynamic resolution"),
    field(Graphics, "EFFECTS_QUALITY", SettingKind::integer(0, 4), "Effects quality"),
    field(Graphics, "FAR_PLANE", SettingKind::integer(0, 3), "Draw distance"),
    field(Graphics, "FLORA_QUALITY", SettingKind::integer(0, 4), "Vegetation quality"),
    field(Graphics, "HAVOK_ENABLED", BooleanZeroOne, "Havok destruction physics"),
    field(Graphics, "HAVOK_QUALITY", SettingKind::integer(0, 2), "Havok physics quality"),
    field(Graphics, "LIGHTING_QUALITY", SettingKind::integer(0, 4), "Lighting quality"),
    field(Graphics, "MOTION_BLUR_QUALITY", SettingKind::integer(0, 3), "Motion blur quality"),
    field(Graphics, "MSAA_QUALITY", NonEditable, "MSAA quality"),
    field(Graphics, "OBJECT_LOD", SettingKind::integer(0, 4), "Object detail"),
    field(
        Graphics,
        "POST_PROCESSING_QUALITY",
        SettingKind::integer(0, 4),
        "Post-processing quality",
    ),
    field(Graphics, "RENDER_PIPELINE", NonEditable, "Render pipeline"),
    field(
        Graphics,
        "SEMITRANSPARENT_LEAVES_ENABLED",
        BooleanZeroOne,
        "Semi-transparent foliage",
    ),
    field(Graphics, "SHADER_DEBUG", NonEditable, "Shader debugging"),
    field(Graphics, "SHADOWS_QUALITY", SettingKind::integer(0, 2), "Shadow quality"),
    field(
        Graphics,
        "SNIPER_MODE_EFFECTS_QUALITY",
        SettingKind::integer(0, 3),
        "Effects quality (sniper mode)",
    ),
    field(Graphics, "SNIPER_MODE_GRASS_ENABLED", BooleanZeroOne, "Grass in sniper mode"),
    field(
        Graphics,
        "SNIPER_MODE_SWINGING_ENABLED",
        BooleanZeroOne,
        "Camera sway in sniper mode",
    ),
    field(
        Graphics,
        "SNIPER_MODE_TERRAIN_TESSELLATION_ENABLED",
        BooleanZeroOne,
        "Terrain tessellation (sniper mode)",
    ),
    field(Graphics, "SPEEDTREE_QUALITY", SettingKind::integer(0, 3), "Tree quality"),
    field(Graphics, "TERRAIN_QUALITY", SettingKind::integer(0, 5), "Terrain quality"),
    field(
        Graphics,
        "TERRAIN_TESSELLATION_ENABLED",
        BooleanZeroOne,
        "Terrain tessellation",
    ),
    field(Graphics, "TEXTURE_QUALITY", SettingKind::integer(0, 4), "Texture quality"),
    field(
        Graphics,
        "TRACK_PHYSICS_QUALITY",
        SettingKind::integer(0, 3),
        "Track physics quality",
    ),
    field(Graphics, "VEHICLE_DUST_ENABLED", BooleanZeroOne, "Vehicle dust"),
    field(Graphics, "VEHICLE_TRACES_ENABLED", BooleanZeroOne, "Vehicle tracks"),
    field(Graphics, "WATER_QUALITY", SettingKind::integer(0, 3), "Water quality"),
    // devicePreferences
    field(Device, "windowMode", SettingKind::integer(0, 2), "Window mode"),
    field(Device, "windowedWidth", SettingKind::integer(800, 7680), "Width (windowed)"),
    field(Device, "windowedHeight", SettingKind::integer(600, 4320), "Height (windowed)"),
    field(Device, "fullscreenWidth", SettingKind::integer(800, 7680), "Width (fullscreen)"),
    field(Device, "fullscreenHeight", SettingKind::integer(600, 4320), "Height (fullscreen)"),
    field(Device, "fullscreenRefresh", SettingKind::integer(10, 400), "Refresh rate"),
    field(Device, "aspectRatio", SettingKind::float(0.1, 10.0, 6), "Aspect ratio"),
    field(Device, "gamma", SettingKind::float(0.5, 2.5, 2), "Gamma"),
    field(Device, "tripleBuffering", BooleanTrueFalse, "Triple buffering"),
];

/// Control modes, in the order the game writes them.
pub const CONTROL_MODES: &[ControlMode] = &[
    ControlMode {
        name: "strategicMode",
        label: "Strategic",
    },
    ControlMode {
        name: "artyMode",
        label: "Artillery",
    },
    ControlMode {
        name: "arcadeMode",
        label: "Arcade",
    },
    ControlMode {
        name: "sniperMode",
        label: "Sniper",
    },
    ControlMode {
        name: "freeVideoMode",
        label: "Free camera",
    },
];

/// Fields found inside every `<mode><camera>` node.
pub const CONTROL_FIELDS: &[FieldSpec] = &[
    field(Control, "horzInvert", BooleanTrueFalse, "Invert horizontal"),
    field(Control, "vertInvert", BooleanTrueFalse, "Invert vertical"),
    field(Control, "keySensitivity", SENSITIVITY, "Keyboard sensitivity"),
    field(Control, "sensitivity", SENSITIVITY, "Mouse sensitivity"),
    field(Control, "scrollSensitivity", SENSITIVITY, "Scroll sensitivity"),
];
