//! # Reconhecedor Heurístico — Gazetteers e Regras para Nomes Indianos
//!
//! Um reconhecedor local, sem modelo, que serve de padrão quando nenhum
//! modelo hospedado está configurado. Combina listas de entidades conhecidas
//! (gazetteers) com regras de contexto:
//!
//! 1. **Organização**: palavras capitalizadas seguidas de um sufixo
//!    corporativo ("Infosys Technologies Ltd", "Punjab National Bank").
//! 2. **Título + nome**: "Mr. Rahul Sharma", "Smt Kavita Rao" → PER sobre o nome.
//! 3. **Primeiro nome conhecido**: "Priya Menon" → PER.
//! 4. **Localização**: cidades e estados indianos, inclusive compostos
//!    ("Tamil Nadu", "New Delhi").
//!
//! As regras rodam nessa ordem e um token marcado por uma regra não é
//! reaproveitado pelas seguintes. A saída usa os códigos `PER`, `ORG` e `LOC`.

use crate::recognizer::{EntityRecognizer, RawEntity, Recognition};
use crate::tokenizer::{tokenize, Token};

/// Títulos que precedem nomes de pessoas
const PERSON_TITLES: &[&str] = &[
    "mr", "mrs", "ms", "miss", "dr", "prof", "shri", "shree", "sri", "smt", "kumari",
    "capt", "col", "maj", "adv", "er",
];

/// Primeiros nomes comuns
const FIRST_NAMES: &[&str] = &[
    "aarav", "aditya", "ajay", "amit", "anil", "arjun", "arun", "ashok", "deepak",
    "dinesh", "ganesh", "karan", "krishna", "manish", "manoj", "mahesh", "mohan",
    "nitin", "prakash", "rahul", "raj", "rajesh", "rakesh", "ramesh", "ravi",
    "rohit", "sachin", "sanjay", "suresh", "vijay", "vikram", "vinod",
    "aishwarya", "ananya", "anita", "anjali", "archana", "deepika", "divya",
    "kavita", "lakshmi", "meena", "neha", "nisha", "pooja", "priya", "radha",
    "rekha", "sita", "sneha", "sunita", "usha",
];

/// Sufixos que indicam organização
const ORG_SUFFIXES: &[&str] = &[
    "ltd", "limited", "pvt", "private", "llp", "inc", "corp", "corporation",
    "bank", "technologies", "industries", "enterprises", "solutions", "services",
    "hospital", "hospitals", "university", "institute", "foundation", "trust",
    "insurance", "motors",
];

/// Cidades, estados e territórios (minúsculas, compostos separados por espaço)
const LOCATIONS: &[&str] = &[
    // Cidades
    "mumbai", "delhi", "new delhi", "bengaluru", "bangalore", "chennai", "kolkata",
    "hyderabad", "pune", "ahmedabad", "jaipur", "lucknow", "kanpur", "nagpur",
    "indore", "bhopal", "patna", "surat", "vadodara", "thane", "noida", "gurugram",
    "gurgaon", "kochi", "coimbatore", "madurai", "mysuru", "mysore", "varanasi",
    "chandigarh", "guwahati", "bhubaneswar", "visakhapatnam", "navi mumbai",
    // Estados e territórios
    "andhra pradesh", "arunachal pradesh", "assam", "bihar", "chhattisgarh", "goa",
    "gujarat", "haryana", "himachal pradesh", "jharkhand", "karnataka", "kerala",
    "madhya pradesh", "maharashtra", "manipur", "meghalaya", "mizoram", "nagaland",
    "odisha", "punjab", "rajasthan", "sikkim", "tamil nadu", "telangana", "tripura",
    "uttar pradesh", "uttarakhand", "west bengal", "jammu and kashmir", "ladakh",
    "puducherry",
    // País
    "india", "bharat",
];

/// Maior número de tokens em uma entrada de [`LOCATIONS`]
const MAX_LOCATION_TOKENS: usize = 3;
/// Maior número de palavras capitalizadas aceitas em um nome
const MAX_NAME_TOKENS: usize = 4;

/// Reconhecedor baseado em regras, sempre disponível.
#[derive(Debug, Clone, Default)]
pub struct HeuristicRecognizer;

impl HeuristicRecognizer {
    pub fn new() -> Self {
        Self
    }

    /// Aplica todas as regras e devolve entidades ordenadas por posição
    pub fn find(&self, text: &str) -> Vec<RawEntity> {
        let tokens = tokenize(text);
        let mut taken = vec![false; tokens.len()];
        let mut entities = Vec::new();

        // 1. Sufixo corporativo: "X Y Ltd" → ORG
        for i in 0..tokens.len() {
            if taken[i] || !is_org_suffix(&tokens[i]) || !tokens[i].is_capitalized() {
                continue;
            }
            let mut first = i;
            while first > 0 && is_name_word(&tokens[first - 1]) && !taken[first - 1] {
                first -= 1;
            }
            if first == i {
                continue;
            }
            let mut last = i;
            loop {
                let next = last + 1;
                if next < tokens.len() && is_org_suffix(&tokens[next]) {
                    last = next;
                } else if next + 1 < tokens.len()
                    && tokens[next].text == "."
                    && is_org_suffix(&tokens[next + 1])
                {
                    last = next + 1;
                } else {
                    break;
                }
            }
            mark(&mut taken, first, last);
            entities.push(entity("ORG", &tokens, first, last));
        }

        // 2. Título + nome: "Dr. Anita Desai" → PER sobre "Anita Desai"
        for i in 0..tokens.len() {
            if taken[i] || !PERSON_TITLES.contains(&tokens[i].lower().as_str()) {
                continue;
            }
            let mut first = i + 1;
            if first < tokens.len() && tokens[first].text == "." {
                first += 1;
            }
            if let Some(last) = name_run(&tokens, &taken, first) {
                mark(&mut taken, first, last);
                entities.push(entity("PER", &tokens, first, last));
            }
        }

        // 3. Primeiro nome conhecido: "Priya Menon" → PER
        for i in 0..tokens.len() {
            if taken[i] || !FIRST_NAMES.contains(&tokens[i].lower().as_str()) {
                continue;
            }
            if let Some(last) = name_run(&tokens, &taken, i) {
                mark(&mut taken, i, last);
                entities.push(entity("PER", &tokens, i, last));
            }
        }

        // 4. Gazetteer de localização (maior casamento primeiro)
        let mut i = 0;
        while i < tokens.len() {
            match location_at(&tokens, &taken, i) {
                Some(last) => {
                    mark(&mut taken, i, last);
                    entities.push(entity("LOC", &tokens, i, last));
                    i = last + 1;
                }
                None => i += 1,
            }
        }

        entities.sort_by_key(|e| e.start);
        entities
    }
}

impl EntityRecognizer for HeuristicRecognizer {
    fn recognize(&self, text: &str) -> Recognition {
        Ok(self.find(text))
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

fn is_org_suffix(token: &Token) -> bool {
    ORG_SUFFIXES.contains(&token.lower().as_str())
}

fn is_title(token: &Token) -> bool {
    PERSON_TITLES.contains(&token.lower().as_str())
}

/// Palavra capitalizada que pode compor um nome próprio
fn is_name_word(token: &Token) -> bool {
    token.is_word() && token.is_capitalized() && !is_title(token)
}

/// Sequência de palavras capitalizadas livres a partir de `first`.
/// Retorna o índice do último token ou `None` se não houver nenhuma.
fn name_run(tokens: &[Token], taken: &[bool], first: usize) -> Option<usize> {
    let mut last = None;
    let mut j = first;
    while j < tokens.len()
        && j < first + MAX_NAME_TOKENS
        && !taken[j]
        && is_name_word(&tokens[j])
        && !is_org_suffix(&tokens[j])
    {
        last = Some(j);
        j += 1;
    }
    last
}

fn location_at(tokens: &[Token], taken: &[bool], i: usize) -> Option<usize> {
    if taken[i] || !tokens[i].is_capitalized() {
        return None;
    }
    let mut best = None;
    for len in 1..=MAX_LOCATION_TOKENS {
        let last = i + len - 1;
        if last >= tokens.len() || taken[last] {
            break;
        }
        let candidate = tokens[i..=last]
            .iter()
            .map(|t| t.lower())
            .collect::<Vec<_>>()
            .join(" ");
        if LOCATIONS.contains(&candidate.as_str()) {
            best = Some(last);
        }
    }
    best
}

fn mark(taken: &mut [bool], first: usize, last: usize) {
    for flag in &mut taken[first..=last] {
        *flag = true;
    }
}

fn entity(category: &str, tokens: &[Token], first: usize, last: usize) -> RawEntity {
    RawEntity::new(category, tokens[first].start, tokens[last].end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(text: &str) -> Vec<(String, &str)> {
        HeuristicRecognizer::new()
            .find(text)
            .into_iter()
            .map(|e| (e.category, &text[e.start..e.end]))
            .collect()
    }

    #[test]
    fn test_title_name_org_and_locations() {
        let text = "Mr. Rahul Sharma works at Infosys Technologies Ltd in Bengaluru, Karnataka.";
        let entities = found(text);
        assert_eq!(
            entities,
            vec![
                ("PER".to_string(), "Rahul Sharma"),
                ("ORG".to_string(), "Infosys Technologies Ltd"),
                ("LOC".to_string(), "Bengaluru"),
                ("LOC".to_string(), "Karnataka"),
            ]
        );
    }

    #[test]
    fn test_known_first_name() {
        let entities = found("please call Priya Menon tomorrow");
        assert_eq!(entities, vec![("PER".to_string(), "Priya Menon")]);
    }

    #[test]
    fn test_multiword_location_prefers_longest() {
        let entities = found("She moved from New Delhi to Tamil Nadu");
        assert_eq!(
            entities,
            vec![
                ("LOC".to_string(), "New Delhi"),
                ("LOC".to_string(), "Tamil Nadu"),
            ]
        );
    }

    #[test]
    fn test_org_with_dotted_suffixes() {
        let entities = found("Acme Widgets Pvt. Ltd. was fined");
        assert_eq!(entities, vec![("ORG".to_string(), "Acme Widgets Pvt. Ltd")]);
    }

    #[test]
    fn test_lowercase_text_is_clean() {
        assert!(found("the bank said my account is fine").is_empty());
        assert!(found("").is_empty());
    }

    #[test]
    fn test_title_without_name_is_ignored() {
        assert!(found("ask the dr about it").is_empty());
    }

    #[test]
    fn test_recognizer_trait() {
        let recognizer = HeuristicRecognizer::new();
        assert_eq!(recognizer.name(), "heuristic");
        assert_eq!(recognizer.recognize("Visit Pune").unwrap().len(), 1);
    }
}
