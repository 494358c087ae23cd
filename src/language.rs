//! Language selection for generated content and player-facing text.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Language used for case generation, suspect dialogue, and UI strings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English. The default; set `language = "ru"` or pass `--language ru` for Russian.
    #[default]
    En,
    /// Russian.
    Ru,
}

impl Language {
    /// Name of the language as written into provider prompts.
    #[instrument]
    pub fn prompt_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Ru => "Russian",
        }
    }

    /// Name of the language as shown to the player.
    #[instrument]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Ru => "Русский",
        }
    }

    /// Switches between the two supported languages.
    #[instrument]
    pub fn toggle(self) -> Self {
        match self {
            Self::En => Self::Ru,
            Self::Ru => Self::En,
        }
    }

    /// Returns the phrasebook of player-facing strings for this language.
    pub fn phrases(self) -> &'static Phrasebook {
        match self {
            Self::En => &EN,
            Self::Ru => &RU,
        }
    }
}

/// Fixed player-facing strings for one language.
#[derive(Debug)]
pub struct Phrasebook {
    /// Game title.
    pub title: &'static str,
    /// Subtitle under the title in the office.
    pub subtitle: &'static str,
    /// Quote shown in the office.
    pub intro_quote: &'static str,
    /// Office action: request a new case.
    pub new_case: &'static str,
    /// Office action: open the shop.
    pub shop: &'static str,
    /// Shown while a provider call is pending.
    pub loading: &'static str,
    /// Notice after a failed provider call.
    pub connection_lost: &'static str,
    /// Case file heading for the narrative description.
    pub incident_report: &'static str,
    /// Case file heading for the clue list.
    pub evidence: &'static str,
    /// Case file heading for the suspect list.
    pub suspects: &'static str,
    /// Accusation prompt.
    pub who_is_killer: &'static str,
    /// Accusation action that returns to the case file.
    pub wait: &'static str,
    /// Result heading on a win.
    pub case_closed: &'static str,
    /// Result heading on a loss.
    pub case_cold: &'static str,
    /// Result action.
    pub back_to_office: &'static str,
    /// Shop item label.
    pub buy_coffee: &'static str,
    /// Shop item description.
    pub restock_energy: &'static str,
    /// Interrogation input placeholder.
    pub ask_question: &'static str,
    /// Interrogation input placeholder when energy is gone.
    pub out_of_energy: &'static str,
    /// Suffix after the remaining energy count.
    pub questions_remaining: &'static str,
    /// Experience label.
    pub xp: &'static str,
    greeting: &'static str,
    success: &'static str,
    failure: &'static str,
}

impl Phrasebook {
    /// Opening line a suspect says when the interrogation starts.
    pub fn greeting(&self, suspect_name: &str) -> String {
        self.greeting.replace("{name}", suspect_name)
    }

    /// Result text after naming the killer.
    pub fn success(&self, killer_name: &str) -> String {
        self.success.replace("{name}", killer_name)
    }

    /// Result text after naming an innocent suspect.
    pub fn failure(&self, killer_name: &str) -> String {
        self.failure.replace("{name}", killer_name)
    }
}

static EN: Phrasebook = Phrasebook {
    title: "NOIR DETECTIVE",
    subtitle: "Homicide Division",
    intro_quote: "The city never sleeps. Neither do its killers.",
    new_case: "Take a new case",
    shop: "Shop",
    loading: "Pulling the file from the archive…",
    connection_lost: "Archive connection lost. Try again.",
    incident_report: "Incident report",
    evidence: "Evidence",
    suspects: "Suspects",
    who_is_killer: "Who is the killer?",
    wait: "Wait, I need more evidence",
    case_closed: "CASE CLOSED",
    case_cold: "CASE GONE COLD",
    back_to_office: "Back to the office",
    buy_coffee: "Black coffee",
    restock_energy: "Restores all interrogation energy",
    ask_question: "Ask a question…",
    out_of_energy: "Out of energy. Visit the shop.",
    questions_remaining: "questions remaining",
    xp: "XP",
    greeting: "I'm {name}. Make it quick, detective. I've got nothing to hide.",
    success: "{name} is behind bars. Justice is served.",
    failure: "Wrong call. The real killer, {name}, walked free.",
};

static RU: Phrasebook = Phrasebook {
    title: "НУАР-ДЕТЕКТИВ",
    subtitle: "Отдел убийств",
    intro_quote: "Город никогда не спит. Как и его убийцы.",
    new_case: "Взять новое дело",
    shop: "Магазин",
    loading: "Достаём дело из архива…",
    connection_lost: "Связь с архивом потеряна. Попробуйте ещё раз.",
    incident_report: "Рапорт о происшествии",
    evidence: "Улики",
    suspects: "Подозреваемые",
    who_is_killer: "Кто убийца?",
    wait: "Подождите, нужно больше улик",
    case_closed: "ДЕЛО ЗАКРЫТО",
    case_cold: "ДЕЛО ЗАШЛО В ТУПИК",
    back_to_office: "Вернуться в офис",
    buy_coffee: "Чёрный кофе",
    restock_energy: "Полностью восстанавливает энергию",
    ask_question: "Задайте вопрос…",
    out_of_energy: "Энергия закончилась. Загляните в магазин.",
    questions_remaining: "вопросов осталось",
    xp: "Опыт",
    greeting: "Я {name}. Давайте быстрее, детектив. Мне нечего скрывать.",
    success: "{name} за решёткой. Справедливость восторжествовала.",
    failure: "Ошибка. Настоящий убийца, {name}, остался на свободе.",
};
