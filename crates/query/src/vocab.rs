// Built-in vocabularies: element names ↔ codes, and the typo-correction word list

/// Canonical (name, code) pairs in scan order.
///
/// Extraction walks this table top to bottom, so its order is observable:
/// oxides first, then trace elements. `as_` and `in_` carry a trailing
/// underscore because that is how the dataset columns are named.
pub const ELEMENTS: &[(&str, &str)] = &[
    ("silicon dioxide", "sio2"),
    ("aluminum oxide", "al2o3"),
    ("iron(III) oxide", "fe2o3"),
    ("titanium dioxide", "tio2"),
    ("calcium oxide", "cao"),
    ("magnesium oxide", "mgo"),
    ("manganese(II) oxide", "mno"),
    ("sodium oxide", "na2o"),
    ("potassium oxide", "k2o"),
    ("phosphorus pentoxide", "p2o5"),
    ("loss on ignition", "loi"),
    ("barium", "ba"),
    ("gallium", "ga"),
    ("scandium", "sc"),
    ("vanadium", "v"),
    ("thorium", "th"),
    ("lead", "pb"),
    ("nickel", "ni"),
    ("cobalt", "co"),
    ("rubidium", "rb"),
    ("strontium", "sr"),
    ("yttrium", "y"),
    ("zirconium", "zr"),
    ("niobium", "nb"),
    ("chromium", "cr"),
    ("copper", "cu"),
    ("zinc", "zn"),
    ("gold", "au"),
    ("lithium", "li"),
    ("cesium", "cs"),
    ("arsenic", "as_"),
    ("antimony", "sb"),
    ("bismuth", "bi"),
    ("selenium", "se"),
    ("silver", "ag"),
    ("beryllium", "be"),
    ("germanium", "ge"),
    ("molybdenum", "mo"),
    ("tin", "sn"),
    ("lanthanum", "la"),
    ("cerium", "ce"),
    ("praseodymium", "pr"),
    ("neodymium", "nd"),
    ("samarium", "sm"),
    ("europium", "eu"),
    ("terbium", "tb"),
    ("gadolinium", "gd"),
    ("dysprosium", "dy"),
    ("holmium", "ho"),
    ("erbium", "er"),
    ("thulium", "tm"),
    ("ytterbium", "yb"),
    ("lutetium", "lu"),
    ("hafnium", "hf"),
    ("tantalum", "ta"),
    ("tungsten", "w"),
    ("uranium", "u"),
    ("platinum", "pt"),
    ("palladium", "pd"),
    ("indium", "in_"),
    ("fluorine", "f"),
    ("tellurium", "te"),
    ("thallium", "tl"),
    ("mercury", "hg"),
    ("cadmium", "cd"),
];

/// Domain words the typo corrector snaps misspellings to.
pub const TYPO_WORDS: &[&str] = &[
    "kriging",
    "concentration",
    "toposheet",
    "interpolation",
    "inverse distance weighted",
    "idw",
    "maximum",
    "minimum",
    "longitude",
    "latitude",
    "aluminum",
];

/// Code for a full element name, case-insensitive.
pub fn code_for(name: &str) -> Option<&'static str> {
    ELEMENTS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, c)| c)
}

/// True if `text` is exactly one of the element names (case-insensitive).
pub fn is_element_name(text: &str) -> bool {
    code_for(text).is_some()
}
