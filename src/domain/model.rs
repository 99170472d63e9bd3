use serde::{Deserialize, Serialize};
use std::fmt;

pub type CategoryId = i64;
pub type PartyId = i64;
pub type CandidateId = i64;
pub type VoteTypeId = i64;

/// 選票上的職位類別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    President,
    SenatorNational,
    SenatorRegional,
    Deputy,
    Parliament,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::President,
        Category::SenatorNational,
        Category::SenatorRegional,
        Category::Deputy,
        Category::Parliament,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Category::President => "president",
            Category::SenatorNational => "senator-national",
            Category::SenatorRegional => "senator-regional",
            Category::Deputy => "deputy",
            Category::Parliament => "parliament",
        }
    }

    pub fn from_key(key: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.key() == key)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::President => "Presidente y Vicepresidentes",
            Category::SenatorNational => "Senadores Nacional",
            Category::SenatorRegional => "Senadores Regional",
            Category::Deputy => "Diputados",
            Category::Parliament => "Parlamento Andino",
        }
    }

    /// 在 `GET /categories` 回應中用來比對的名稱
    pub fn backend_name(&self) -> &'static str {
        match self {
            Category::President => "Presidente",
            Category::SenatorNational => "Senador Nacional",
            Category::SenatorRegional => "Senador Regional",
            Category::Deputy => "Diputado",
            Category::Parliament => "Parlamento",
        }
    }

    pub fn allows_preferential(&self) -> bool {
        !matches!(self, Category::President)
    }

    pub fn max_preferential(&self) -> usize {
        if self.allows_preferential() {
            2
        } else {
            0
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    #[serde(rename = "categoryId", alias = "id_categoria")]
    pub id: CategoryId,
    #[serde(alias = "nombre_categoria")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    #[serde(rename = "partyId", alias = "id_partido")]
    pub id: PartyId,
    #[serde(alias = "nombre_partido")]
    pub name: String,
    #[serde(rename = "logoUrl", alias = "logo", default)]
    pub logo_url: Option<String>,
}

/// 後端傳回的候選人資料；沒有號碼的候選人不能被選為優先票
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    #[serde(rename = "candidateId", alias = "id_candidato")]
    pub id: CandidateId,
    #[serde(rename = "categoryId", alias = "id_categoria")]
    pub category_id: CategoryId,
    #[serde(rename = "partyId", alias = "id_partido")]
    pub party_id: PartyId,
    #[serde(rename = "ballotNumber", alias = "numero_candidato", default)]
    pub ballot_number: Option<u32>,
    #[serde(alias = "nombre_candidato")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub ballot_number: u32,
    pub party_id: PartyId,
    pub category_id: CategoryId,
}

impl CandidateRecord {
    pub fn into_candidate(self) -> Option<Candidate> {
        let ballot_number = self.ballot_number?;
        Some(Candidate {
            id: self.id,
            name: self.name,
            ballot_number,
            party_id: self.party_id,
            category_id: self.category_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteType {
    #[serde(rename = "voteTypeId", alias = "id_tipo_voto")]
    pub id: VoteTypeId,
    #[serde(alias = "nombre_tipo")]
    pub name: String,
}

/// 單一類別目前的選擇
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub selected_party: Option<Party>,
    pub selected_candidates: Vec<Candidate>,
}

impl Selection {
    pub fn new(selected_party: Option<Party>, selected_candidates: Vec<Candidate>) -> Self {
        Self {
            selected_party,
            selected_candidates,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selected_party.is_none() && self.selected_candidates.is_empty()
    }

    pub fn party_id(&self) -> Option<PartyId> {
        self.selected_party.as_ref().map(|p| p.id)
    }

    /// 依偏好順序排列的候選人號碼
    pub fn preferential_numbers(&self) -> Vec<u32> {
        self.selected_candidates
            .iter()
            .map(|c| c.ballot_number)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Classification {
    Valid,
    Null,
    Blank,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Valid => "Válido",
            Classification::Null => "Nulo",
            Classification::Blank => "En Blanco",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryVote {
    pub category_id: CategoryId,
    pub party_id: PartyId,
    pub preferential_candidate_numbers: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallotSubmission {
    pub voter_id: String,
    pub vote_type_id: VoteTypeId,
    pub per_category: Vec<CategoryVote>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    #[serde(rename = "voteId", alias = "id_voto")]
    pub vote_id: i64,
    #[serde(rename = "fecha", alias = "timestamp")]
    pub timestamp: String,
    #[serde(rename = "tipoVoto", alias = "tipo_voto", alias = "voteTypeLabel", default)]
    pub vote_type_label: String,
}

impl Receipt {
    pub fn parsed_timestamp(&self) -> Option<chrono::NaiveDateTime> {
        parse_backend_timestamp(&self.timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReceiptEnvelope {
    #[serde(alias = "voto")]
    pub vote: Receipt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voter {
    #[serde(rename = "nationalId", alias = "dni")]
    pub national_id: String,
    #[serde(rename = "firstNames", alias = "nombres", default)]
    pub first_names: String,
    #[serde(rename = "lastNames", alias = "apellidos", default)]
    pub last_names: String,
    #[serde(alias = "distrito", default)]
    pub district: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

impl Voter {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_names, self.last_names)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorVote {
    pub fecha: String,
    #[serde(rename = "voteId", alias = "id_voto", default)]
    pub vote_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoterStatus {
    pub exists: bool,
    #[serde(rename = "hasVoted", alias = "has_voted", default)]
    pub has_voted: bool,
    #[serde(alias = "elector", default)]
    pub voter: Option<Voter>,
    #[serde(rename = "priorVote", alias = "voto", default)]
    pub prior_vote: Option<PriorVote>,
    #[serde(default)]
    pub message: Option<String>,
}

/// 已通過驗證、保存在工作階段中的選民
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedVoter {
    pub national_id: String,
    pub voter: Option<Voter>,
}

/// 後端以 Python `isoformat()` 輸出時間，可能帶或不帶時區
pub fn parse_backend_timestamp(raw: &str) -> Option<chrono::NaiveDateTime> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
}
