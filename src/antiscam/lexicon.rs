//! Słowniki AntiScam. To są dane, nie logika: każdą listę można nadpisać w
//! `[antiscam.lexicon]` w pliku konfiguracyjnym (albo w testach).
//! Domyślne listy są po francusku, bo taka jest społeczność serwera.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    /// Pojedynczy znak waluty wystarcza do trafienia.
    pub currency_glyphs: Vec<String>,
    /// Porównywane jako całe słowa (`\b\w+\b`), nie podciągi.
    pub exact_words: Vec<String>,
    /// Tier 1: jedno trafienie (podciąg) = podejrzane.
    pub high_risk: Vec<String>,
    /// Tier 2: liczymy trafienia.
    pub suspicious: Vec<String>,
    /// Tier 2: regexy na tekście po lowercase.
    pub patterns: Vec<String>,
    pub keyword_threshold: usize,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            currency_glyphs: to_owned(CURRENCY_GLYPHS),
            exact_words: to_owned(EXACT_WORDS),
            high_risk: to_owned(HIGH_RISK),
            suspicious: to_owned(SUSPICIOUS),
            patterns: to_owned(PATTERNS),
            keyword_threshold: 2,
        }
    }
}

fn to_owned(src: &[&str]) -> Vec<String> {
    src.iter().map(|s| s.to_string()).collect()
}

pub const CURRENCY_GLYPHS: &[&str] = &["€", "$"];

pub const EXACT_WORDS: &[&str] = &[
    "euro", "euros", "paypal", "boursorama", "revolut", "sous", "argent", "fric",
];

pub const HIGH_RISK: &[&str] = &[
    // finanse
    "paypal", "boursorama", "revolut", "binance", "coinbase", "n26", "wise",
    "lydia", "paysafecard", "western union", "moneygram", "cashapp",
    "euro", "euros", "€", "$", "argent", "sous", "fric", "thune", "pognon",
    "banque", "carte bancaire", "virement", "transfert", "paiement",
    // polecenia / kody
    "parrainage", "parrain", "filleul", "code promo", "code parrainage",
    "utilise mon code", "utilise mon lien", "inscris-toi avec mon lien",
    // klasyka scamu
    "argent facile", "argent rapide", "revenus passifs", "gagner de l'argent",
    "devenir riche", "millionnaire", "fortune", "sans effort", "sans risque",
    "doublez votre argent", "triplez votre mise", "rendement", "investissement sûr",
    // presja czasu
    "offre limitée", "dernière chance", "places limitées", "ne ratez pas",
    "opportunité unique", "aujourd'hui seulement", "avant fermeture",
];

pub const SUSPICIOUS: &[&str] = &[
    // pieniądze
    "monnaie", "cash", "liquide", "gratuit", "bonus", "prime", "commission",
    "bénéfice", "profit", "gains", "revenus", "salaire", "rémunération", "financement",
    // krypto
    "crypto", "bitcoin", "ethereum", "btc", "eth", "wallet", "portefeuille",
    "blockchain", "nft", "token", "mining", "minage", "altcoin", "defi",
    "staking", "trading", "exchange", "ico", "shitcoin", "pump", "dump",
    // "metody"
    "méthode", "technique", "secret", "privé", "exclusif", "garantie", "validé",
    "astuce", "truc", "combine", "système", "stratégie", "formule", "programme",
    "formation", "coaching", "mentorat", "masterclass", "webinaire",
    // słownik oszustw
    "arnaque", "hack", "exploit", "faille", "bug", "glitch", "bypass",
    "contournement", "non détecté", "indétectable", "escroquerie", "fraude",
];

pub const PATTERNS: &[&str] = &[
    r"gagne[rz]?\s+\d+[€$]\s+(?:par|en)\s+\d+\s+(?:jour|heure|minute|seconde)",
    r"\d+[€$]\s+(?:par|en)\s+\d+\s+(?:jour|heure|minute|seconde)",
    r"(?:nouvelle|secret|privé)\s+(?:méthode|technique)",
    r"(?:argent|euros|dollars)\s+(?:facile|rapide|garanti)",
    r"(?:paypal|boursorama|revolut|binance|coinbase)\s+\d{4}",
    r"(?:contact|mp|dm|message)\s+(?:moi|privé)",
    r"(?:lien|link)\s+(?:en|dans)\s+(?:bio|profil|dm|mp)",
    r"parrain(?:age)?\s+(?:code|lien)",
    r"code\s+(?:promo|parrain(?:age)?)",
    r"(?:utilise|utiliser|utilisez)\s+(?:mon|ce)\s+(?:code|lien)",
    r"(?:inscri(?:s|vez|ption))\s+(?:avec|via|par|grace|grâce)\s+(?:mon|ce|le)\s+(?:lien|code)",
    r"(?:euros?|€|\$|dollars?)\s+(?:offert|gratuit|cadeau|bonus)",
    r"(?:jusqu'à|jusque?)\s+\d+[€$]",
    r"(?:recevez|recevr(?:ai|ez)|gagne[rz]?)\s+(?:jusqu'à|jusque?)?\s+\d+[€$]",
];

/// Treści "spowiedzi" publikowane w miejsce usuniętej wiadomości.
pub const CONFESSIONS: &[&str] = &[
    "Je suis un arnaqueur, venez me signaler en privé 😭",
    "Je passe mes journées à essayer d'arnaquer des gens parce que j'ai raté ma vie",
    "J'arnaque les gens parce que j'ai pas d'amis et j'ai besoin d'attention",
    "J'adore escroquer les gens et je suis fier de ne rien accomplir de ma vie",
    "Mes parents seraient tellement déçus s'ils savaient que je suis devenu un arnaqueur",
    "Je n'ai aucune compétence réelle, donc j'essaie d'arnaquer les gens sur Discord",
    "Signaler mon compte SVP, je suis un scammer et je mérite d'être banni",
    "Je suis tellement nul que je dois voler l'argent des autres pour me sentir important",
    "Regardez-moi, je suis un arnaqueur pathétique qui essaie de vous voler votre argent",
    "Mon QI est si bas que je pense que personne ne remarquera que je suis un scammer",
    "ALERTE ARNAQUE : Ne me faites pas confiance, je suis là pour vous escroquer !",
    "Je suis un scammer et je viens d'être attrapé par le système anti-arnaque 🤡",
    "Oups, je viens de me faire griller en essayant de vous arnaquer 😂",
    "Mon message d'arnaque vient d'être transformé en aveu public 🚨",
    "Je pensais être intelligent, mais le bot vient de me ridiculiser devant tout le monde",
];

pub fn default_confessions() -> Vec<String> {
    to_owned(CONFESSIONS)
}
